//! Integration tests for the route guard table.

use dashgate_ui::{Route, RouteDecision, View, navigate, resolve};

#[test]
fn route_guard_tests_anonymous_table() {
    assert_eq!(resolve("/login", false), RouteDecision::Render(View::Login));
    assert_eq!(resolve("/", false), RouteDecision::Redirect(Route::Login));
    assert_eq!(resolve("/dashboard", false), RouteDecision::Redirect(Route::Login));
    assert_eq!(resolve("/upload", false), RouteDecision::Redirect(Route::Login));
    assert_eq!(resolve("/nowhere", false), RouteDecision::Redirect(Route::Root));
}

#[test]
fn route_guard_tests_authenticated_table() {
    assert_eq!(resolve("/login", true), RouteDecision::Redirect(Route::Dashboard));
    assert_eq!(resolve("/", true), RouteDecision::Redirect(Route::Dashboard));
    assert_eq!(resolve("/dashboard", true), RouteDecision::Render(View::Dashboard));
    assert_eq!(resolve("/upload", true), RouteDecision::Render(View::Upload));
    assert_eq!(resolve("/nowhere", true), RouteDecision::Redirect(Route::Root));
}

#[test]
fn route_guard_tests_unknown_path_settles_on_login_when_anonymous() {
    let navigation = navigate("/reports/2024", false).expect("redirects should settle");
    assert_eq!(navigation.view, View::Login);
    assert_eq!(navigation.path, "/login");
    assert_eq!(navigation.redirects, vec!["/", "/login"]);
}

#[test]
fn route_guard_tests_unknown_path_settles_on_dashboard_when_signed_in() {
    let navigation = navigate("/reports/2024", true).expect("redirects should settle");
    assert_eq!(navigation.view, View::Dashboard);
    assert_eq!(navigation.redirects, vec!["/", "/dashboard"]);
}

#[test]
fn route_guard_tests_direct_render_has_no_redirects() {
    let navigation = navigate("/upload/", true).unwrap();
    assert_eq!(navigation.view, View::Upload);
    assert_eq!(navigation.path, "/upload");
    assert!(navigation.redirects.is_empty());
}
