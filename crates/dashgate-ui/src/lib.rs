#![warn(missing_docs)]
//! # dashgate-ui
//!
//! ## Purpose
//! Defines the UI-facing state that sits above the session store: display
//! theme, route guarding, and layout chrome.
//!
//! ## Responsibilities
//! - Persist and toggle the dark/light theme, seeded from the system signal.
//! - Decide which view a path renders, or where it redirects, given whether a
//!   user is signed in.
//! - Track sidebar and profile menu visibility and the active sidebar link.
//!
//! ## Data flow
//! Shell events -> [`navigate`] picks a [`View`] -> the shell renders it inside
//! a layout whose colors come from [`ThemeStore`] and whose menus come from
//! [`LayoutState`].
//!
//! ## Ownership and lifetimes
//! [`ThemeStore`] shares storage through `Arc`; everything else is plain owned
//! state held by the application container.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. The only error is
//! [`UiError::RedirectLoop`], which cannot occur with the built-in route table.

use std::sync::Arc;

use dashgate_core::{KeyValueStore, ThemeMode, read_theme, write_theme};
use thiserror::Error;
use url::Url;

const ROUTE_BASE: &str = "app://dashgate/";
const MAX_REDIRECTS: usize = 4;

/// Persisted display theme.
#[derive(Clone)]
pub struct ThemeStore {
    mode: ThemeMode,
    storage: Arc<dyn KeyValueStore>,
}

impl ThemeStore {
    /// Loads the persisted theme, falling back to `system` when none is stored
    /// or storage is unreadable.
    pub fn load(storage: Arc<dyn KeyValueStore>, system: ThemeMode) -> Self {
        let mode = match read_theme(storage.as_ref()) {
            Ok(Some(mode)) => mode,
            Ok(None) => system,
            Err(error) => {
                tracing::warn!(%error, "ignoring unreadable theme preference");
                system
            }
        };
        Self { mode, storage }
    }

    /// Current theme.
    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    /// Returns `true` in dark mode.
    pub fn is_dark_mode(&self) -> bool {
        self.mode.is_dark()
    }

    /// Flips the theme and persists the new value.
    pub fn toggle(&mut self) -> ThemeMode {
        self.mode = self.mode.toggled();
        if let Err(error) = write_theme(self.storage.as_ref(), self.mode) {
            tracing::warn!(%error, "failed to persist theme");
        }
        tracing::info!(theme = self.mode.as_str(), "theme toggled");
        self.mode
    }
}

impl std::fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeStore")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Known application paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/login`
    Login,
    /// `/`
    Root,
    /// `/dashboard`
    Dashboard,
    /// `/upload`
    Upload,
}

impl Route {
    /// Canonical path.
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Root => "/",
            Route::Dashboard => "/dashboard",
            Route::Upload => "/upload",
        }
    }

    /// Matches a requested path, ignoring query, fragment and trailing slash.
    pub fn parse(path: &str) -> Option<Self> {
        match normalize_path(path)?.as_str() {
            "/login" => Some(Route::Login),
            "/" => Some(Route::Root),
            "/dashboard" => Some(Route::Dashboard),
            "/upload" => Some(Route::Upload),
            _ => None,
        }
    }

    /// Returns `true` for routes behind the login gate.
    pub fn is_protected(self) -> bool {
        !matches!(self, Route::Login)
    }
}

fn normalize_path(path: &str) -> Option<String> {
    let base = Url::parse(ROUTE_BASE).ok()?;
    let joined = base.join(path.trim()).ok()?;
    let resolved = joined.path();
    let trimmed = resolved.trim_end_matches('/');
    if trimmed.is_empty() {
        Some("/".to_string())
    } else {
        Some(trimmed.to_string())
    }
}

/// Views the shell can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Sign-in form.
    Login,
    /// Metrics dashboard.
    Dashboard,
    /// Media upload form.
    Upload,
}

/// Outcome of guarding one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render a view at the requested path.
    Render(View),
    /// Replace the requested path with another one.
    Redirect(Route),
}

/// Decides what a path renders for the current session.
pub fn resolve(path: &str, authenticated: bool) -> RouteDecision {
    match (Route::parse(path), authenticated) {
        (None, _) => RouteDecision::Redirect(Route::Root),
        (Some(Route::Login), true) => RouteDecision::Redirect(Route::Dashboard),
        (Some(Route::Login), false) => RouteDecision::Render(View::Login),
        (Some(_), false) => RouteDecision::Redirect(Route::Login),
        (Some(Route::Root), true) => RouteDecision::Redirect(Route::Dashboard),
        (Some(Route::Dashboard), true) => RouteDecision::Render(View::Dashboard),
        (Some(Route::Upload), true) => RouteDecision::Render(View::Upload),
    }
}

/// Final result of following redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// View to render.
    pub view: View,
    /// Canonical path of the rendered view.
    pub path: &'static str,
    /// Paths passed through on the way, in order.
    pub redirects: Vec<&'static str>,
}

/// Follows redirects from `path` until a view renders.
///
/// # Errors
/// Returns [`UiError::RedirectLoop`] if no view renders within a few hops.
pub fn navigate(path: &str, authenticated: bool) -> Result<Navigation, UiError> {
    let mut redirects = Vec::new();
    let mut current = path.to_string();

    for _ in 0..=MAX_REDIRECTS {
        match resolve(&current, authenticated) {
            RouteDecision::Render(view) => {
                let path = Route::parse(&current).map_or("/", Route::path);
                return Ok(Navigation {
                    view,
                    path,
                    redirects,
                });
            }
            RouteDecision::Redirect(route) => {
                tracing::debug!(from = %current, to = route.path(), "redirect");
                redirects.push(route.path());
                current = route.path().to_string();
            }
        }
    }

    Err(UiError::RedirectLoop(path.to_string()))
}

/// One sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    /// Visible label.
    pub name: &'static str,
    /// Target route.
    pub route: Route,
}

/// Sidebar entries in display order.
pub const SIDEBAR_LINKS: [NavLink; 2] = [
    NavLink {
        name: "Dashboard",
        route: Route::Dashboard,
    },
    NavLink {
        name: "Upload",
        route: Route::Upload,
    },
];

/// Returns the sidebar link whose path equals `path` exactly.
pub fn active_link(path: &str) -> Option<&'static NavLink> {
    SIDEBAR_LINKS.iter().find(|link| link.route.path() == path)
}

/// Menu visibility for the protected layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutState {
    /// Mobile sidebar overlay is open.
    pub mobile_menu_open: bool,
    /// Navbar profile dropdown is open.
    pub profile_menu_open: bool,
}

impl LayoutState {
    /// Toggles the mobile sidebar.
    pub fn toggle_mobile_menu(&mut self) {
        self.mobile_menu_open = !self.mobile_menu_open;
    }

    /// Toggles the profile dropdown.
    pub fn toggle_profile_menu(&mut self) {
        self.profile_menu_open = !self.profile_menu_open;
    }

    /// Closes the mobile sidebar on every route change.
    pub fn on_navigate(&mut self) {
        self.mobile_menu_open = false;
    }
}

/// UI errors.
#[derive(Debug, Error)]
pub enum UiError {
    /// Redirects did not settle on a view.
    #[error("redirect loop starting at {0}")]
    RedirectLoop(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for path matching and layout state.

    use super::*;

    #[test]
    fn path_matching_ignores_query_fragment_and_trailing_slash() {
        assert_eq!(Route::parse("/dashboard/"), Some(Route::Dashboard));
        assert_eq!(Route::parse("/upload?tab=video#top"), Some(Route::Upload));
        assert_eq!(Route::parse(""), Some(Route::Root));
        assert_eq!(Route::parse("/settings"), None);
        assert_eq!(Route::parse("/dashboard/extra"), None);
    }

    #[test]
    fn navigation_closes_mobile_menu_only() {
        let mut layout = LayoutState::default();
        layout.toggle_mobile_menu();
        layout.toggle_profile_menu();

        layout.on_navigate();

        assert!(!layout.mobile_menu_open);
        assert!(layout.profile_menu_open);
    }

    #[test]
    fn active_link_requires_exact_path() {
        assert_eq!(active_link("/upload").map(|link| link.name), Some("Upload"));
        assert_eq!(active_link("/upload/"), None);
        assert_eq!(active_link("/"), None);
    }
}
