//! Integration tests for dashboard parsing and projection helpers.

use dashgate_dashboard::{
    ChartKind, ChartPalette, DashboardError, ProductTabs, ReportFrame, ReportLoadState, Trend,
    default_dashboard, parse_dashboard,
};

#[test]
fn dashboard_model_tests_parse_fixture_document() {
    let raw = include_str!("../../../contracts/fixtures/dashboard.valid.json");
    let dashboard = parse_dashboard(raw).expect("fixture should parse");

    let sales = dashboard.chart("sales").expect("fixture has a sales chart");
    assert_eq!(sales.kind, ChartKind::Doughnut);
    assert_eq!(sales.datasets[0].colors.len(), sales.labels.len());
}

#[test]
fn dashboard_model_tests_round_trip_built_in_dashboard() {
    let encoded = serde_json::to_string(&default_dashboard()).expect("dashboard should encode");
    let decoded = parse_dashboard(&encoded).expect("encoded dashboard should parse");
    assert_eq!(decoded, default_dashboard());
}

#[test]
fn dashboard_model_tests_reject_unknown_chart_reference() {
    let mut dashboard = default_dashboard();
    dashboard.stats[0].chart_id = Some("missing".to_string());
    let raw = serde_json::to_string(&dashboard).unwrap();

    assert!(matches!(
        parse_dashboard(&raw),
        Err(DashboardError::InvalidContract(message)) if message.contains("missing")
    ));
}

#[test]
fn dashboard_model_tests_reject_malformed_json() {
    assert!(matches!(
        parse_dashboard("{\"charts\": ["),
        Err(DashboardError::Decode(_))
    ));
}

#[test]
fn dashboard_model_tests_stats_trend_follows_sign() {
    let dashboard = default_dashboard();
    let trends: Vec<Trend> = dashboard.stats.iter().map(|card| card.trend()).collect();
    assert_eq!(trends, vec![Trend::Down, Trend::Up]);
}

#[test]
fn dashboard_model_tests_palette_switches_with_theme() {
    let dark = ChartPalette::for_theme(true);
    let light = ChartPalette::for_theme(false);

    assert_eq!(dark.grid, "#374151");
    assert_eq!(light.grid, "#e5e7eb");
    assert_ne!(dark.ticks, light.ticks);
}

#[test]
fn dashboard_model_tests_product_tabs_keep_one_active() {
    let mut tabs = ProductTabs::new(default_dashboard().products);
    assert_eq!(tabs.active(), Some("App"));

    assert!(tabs.select(2));
    assert_eq!(tabs.active(), Some("SaaS"));
    assert!(!tabs.select(9));
    assert_eq!(tabs.active_index(), 2);
}

#[test]
fn dashboard_model_tests_report_loads_once() {
    let mut frame = ReportFrame::new(&default_dashboard().report_url).unwrap();
    assert_eq!(frame.state(), ReportLoadState::Loading);
    assert_eq!(frame.fallback_message(), None);

    frame.on_load();
    assert_eq!(frame.state(), ReportLoadState::Loaded);
}
