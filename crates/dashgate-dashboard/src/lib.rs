#![warn(missing_docs)]
//! # dashgate-dashboard
//!
//! ## Purpose
//! Defines the metrics dashboard model: chart datasets, stats cards, product
//! tabs and the embedded report frame.
//!
//! ## Responsibilities
//! - Provide the built-in dashboard and parse dashboards from JSON.
//! - Validate that every dataset lines up with its chart labels.
//! - Pick chart palette colors from the active theme.
//! - Track embedded report load state from load/error events.
//!
//! ## Data flow
//! [`default_dashboard`] or [`parse_dashboard`] -> [`Dashboard`] -> a chart
//! renderer consumes plain label/number arrays plus a [`ChartPalette`].
//!
//! ## Ownership and lifetimes
//! All values are owned so a dashboard can outlive the buffer it was parsed
//! from.
//!
//! ## Error model
//! Malformed JSON and label/data mismatches return [`DashboardError`]. A report
//! that fails to load is state, not an error: it shows a static fallback and is
//! never retried.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Canonical schema tag for v1 dashboards.
pub const DASHBOARD_SCHEMA_VERSION_V1: &str = "v1";

/// Embedded analytics report shown below the charts.
pub const DEFAULT_REPORT_URL: &str =
    "https://lookerstudio.google.com/embed/reporting/79d97827-3aaa-4477-bb96-175b63f5db52/page/JgD";

/// Headline shown when the embedded report fails.
pub const REPORT_FAILURE_MESSAGE: &str = "Failed to load dashboard";

/// Hint shown under [`REPORT_FAILURE_MESSAGE`].
pub const REPORT_FAILURE_HINT: &str = "Please try refreshing the page";

/// Complete dashboard document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Document schema version.
    pub schema_version: String,
    /// Figures on the welcome card.
    #[serde(default)]
    pub welcome_metrics: Vec<Metric>,
    /// Every chart on the page.
    pub charts: Vec<Chart>,
    /// Summary cards, each referencing a chart by id.
    #[serde(default)]
    pub stats: Vec<StatsCard>,
    /// Product category tab names.
    #[serde(default)]
    pub products: Vec<String>,
    /// Embedded report URL.
    pub report_url: String,
}

impl Dashboard {
    /// Looks up a chart by id.
    pub fn chart(&self, id: &str) -> Option<&Chart> {
        self.charts.iter().find(|chart| chart.id == id)
    }

    /// Greeting line for the welcome card.
    pub fn greeting(&self, display_name: &str) -> String {
        format!("Welcome Back {display_name}")
    }

    /// Checks chart shapes and stats-card references.
    ///
    /// # Errors
    /// Returns [`DashboardError::InvalidContract`] on the first violation.
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.schema_version.trim().is_empty() {
            return Err(DashboardError::InvalidContract(
                "schema_version is empty".to_string(),
            ));
        }

        for chart in &self.charts {
            chart.validate()?;
        }

        for card in &self.stats {
            if let Some(chart_id) = &card.chart_id
                && self.chart(chart_id).is_none()
            {
                return Err(DashboardError::InvalidContract(format!(
                    "stats card '{}' references unknown chart '{chart_id}'",
                    card.title
                )));
            }
        }

        validate_report_url(&self.report_url)?;
        Ok(())
    }
}

/// Labelled figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    /// Caption.
    pub label: String,
    /// Pre-formatted value.
    pub value: String,
}

/// Chart family handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Line chart.
    Line,
    /// Bar chart.
    Bar,
    /// Doughnut chart.
    Doughnut,
}

/// One chart with its labels and series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    /// Stable identifier.
    pub id: String,
    /// Heading.
    pub title: String,
    /// Chart family.
    pub kind: ChartKind,
    /// Category axis labels.
    pub labels: Vec<String>,
    /// Series plotted against `labels`.
    pub datasets: Vec<Dataset>,
}

impl Chart {
    fn validate(&self) -> Result<(), DashboardError> {
        if self.datasets.is_empty() {
            return Err(DashboardError::InvalidContract(format!(
                "chart '{}' has no datasets",
                self.id
            )));
        }

        for dataset in &self.datasets {
            if dataset.data.len() != self.labels.len() {
                return Err(DashboardError::InvalidContract(format!(
                    "chart '{}' has {} labels but a dataset with {} points",
                    self.id,
                    self.labels.len(),
                    dataset.data.len()
                )));
            }
            if dataset.data.iter().any(|value| !value.is_finite()) {
                return Err(DashboardError::InvalidContract(format!(
                    "chart '{}' contains a non-finite value",
                    self.id
                )));
            }
        }

        Ok(())
    }
}

/// One data series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Legend label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// One value per chart label.
    pub data: Vec<f64>,
    /// One color for the series, or one per point.
    pub colors: Vec<String>,
}

impl Dataset {
    fn series(label: &str, color: &str, data: &[f64]) -> Self {
        Self {
            label: Some(label.to_string()),
            data: data.to_vec(),
            colors: vec![color.to_string()],
        }
    }
}

/// Card accent color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    /// Teal.
    Teal,
    /// Pink.
    Pink,
    /// Indigo.
    Indigo,
}

/// Direction of a stats-card change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// Change is zero or positive.
    Up,
    /// Change starts with `-`.
    Down,
}

/// Summary figure with a change indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsCard {
    /// Heading.
    pub title: String,
    /// Pre-formatted value.
    pub value: String,
    /// Pre-formatted change, for example `-12%`.
    pub change: String,
    /// Accent color.
    pub accent: Accent,
    /// Chart drawn inside the card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_id: Option<String>,
}

impl StatsCard {
    /// Trend implied by the change text.
    pub fn trend(&self) -> Trend {
        if self.change.trim_start().starts_with('-') {
            Trend::Down
        } else {
            Trend::Up
        }
    }
}

/// Theme-dependent colors passed to the chart renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPalette {
    /// Legend label color.
    pub legend: &'static str,
    /// Axis tick color.
    pub ticks: &'static str,
    /// Grid line color.
    pub grid: &'static str,
}

impl ChartPalette {
    /// Palette for the dark or light theme.
    pub fn for_theme(is_dark_mode: bool) -> Self {
        if is_dark_mode {
            Self {
                legend: "#e5e7eb",
                ticks: "#9ca3af",
                grid: "#374151",
            }
        } else {
            Self {
                legend: "#4b5563",
                ticks: "#6b7280",
                grid: "#e5e7eb",
            }
        }
    }
}

/// Product category selector with exactly one active tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductTabs {
    products: Vec<String>,
    active: usize,
}

impl ProductTabs {
    /// Creates tabs with the first one active.
    pub fn new(products: Vec<String>) -> Self {
        Self {
            products,
            active: 0,
        }
    }

    /// Activates a tab. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.products.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    /// Name of the active tab.
    pub fn active(&self) -> Option<&str> {
        self.products.get(self.active).map(String::as_str)
    }

    /// Index of the active tab.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// All tab names.
    pub fn products(&self) -> &[String] {
        &self.products
    }
}

/// Load state of the embedded report frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLoadState {
    /// Waiting for the frame's load event.
    Loading,
    /// Frame reported load.
    Loaded,
    /// Frame reported an error. Not retried.
    Failed,
}

/// Embedded third-party report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFrame {
    url: Url,
    state: ReportLoadState,
}

impl ReportFrame {
    /// Creates a frame in the `Loading` state.
    ///
    /// # Errors
    /// Returns [`DashboardError::InvalidReportUrl`] unless `url` is HTTPS.
    pub fn new(url: &str) -> Result<Self, DashboardError> {
        Ok(Self {
            url: validate_report_url(url)?,
            state: ReportLoadState::Loading,
        })
    }

    /// Frame URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Current load state.
    pub fn state(&self) -> ReportLoadState {
        self.state
    }

    /// Handles the frame's load event.
    pub fn on_load(&mut self) {
        if self.state == ReportLoadState::Loading {
            self.state = ReportLoadState::Loaded;
        }
    }

    /// Handles the frame's error event.
    pub fn on_error(&mut self) {
        if self.state != ReportLoadState::Failed {
            tracing::warn!(url = %self.url, "embedded report failed to load");
        }
        self.state = ReportLoadState::Failed;
    }

    /// Static fallback text when the frame failed.
    pub fn fallback_message(&self) -> Option<(&'static str, &'static str)> {
        (self.state == ReportLoadState::Failed).then_some((REPORT_FAILURE_MESSAGE, REPORT_FAILURE_HINT))
    }
}

/// Checks that a report URL parses and uses HTTPS.
///
/// # Errors
/// Returns [`DashboardError::InvalidReportUrl`] otherwise.
pub fn validate_report_url(raw: &str) -> Result<Url, DashboardError> {
    let parsed = Url::parse(raw)
        .map_err(|error| DashboardError::InvalidReportUrl(format!("invalid report url: {error}")))?;
    if parsed.scheme() != "https" {
        return Err(DashboardError::InvalidReportUrl(
            "report url must use https".to_string(),
        ));
    }
    Ok(parsed)
}

/// Parses and validates a dashboard document.
///
/// # Errors
/// Returns [`DashboardError::Decode`] for invalid JSON and
/// [`DashboardError::InvalidContract`] for shape violations.
pub fn parse_dashboard(raw: &str) -> Result<Dashboard, DashboardError> {
    let parsed: Dashboard = serde_json::from_str(raw).map_err(DashboardError::Decode)?;
    parsed.validate()?;
    Ok(parsed)
}

/// Built-in dashboard content.
pub fn default_dashboard() -> Dashboard {
    let months = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep"];
    let weekdays = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

    Dashboard {
        schema_version: DASHBOARD_SCHEMA_VERSION_V1.to_string(),
        welcome_metrics: vec![
            Metric {
                label: "Budget".to_string(),
                value: "$98,450".to_string(),
            },
            Metric {
                label: "Budget".to_string(),
                value: "$2,440".to_string(),
            },
        ],
        charts: vec![
            Chart {
                id: "revenue".to_string(),
                title: "Revenue Forecast".to_string(),
                kind: ChartKind::Line,
                labels: to_labels(&months[..8]),
                datasets: vec![
                    Dataset::series("2024", "#6366F1", &[65.0, 80.0, 81.0, 56.0, 55.0, 75.0, 40.0, 20.0]),
                    Dataset::series("2023", "#EC4899", &[30.0, 40.0, 60.0, 70.0, 50.0, 60.0, 120.0, 100.0]),
                    Dataset::series("2022", "#06B6D4", &[45.0, 60.0, 55.0, 50.0, 45.0, 60.0, 55.0, 45.0]),
                ],
            },
            Chart {
                id: "customers".to_string(),
                title: "Customers".to_string(),
                kind: ChartKind::Line,
                labels: to_labels(&weekdays),
                datasets: vec![Dataset::series(
                    "Customers",
                    "#6366F1",
                    &[12.0, 19.0, 10.0, 15.0, 20.0, 30.0, 25.0],
                )],
            },
            Chart {
                id: "projects".to_string(),
                title: "Projects".to_string(),
                kind: ChartKind::Bar,
                labels: to_labels(&months),
                datasets: vec![Dataset::series(
                    "Projects",
                    "rgba(236, 72, 153, 0.8)",
                    &[65.0, 59.0, 80.0, 81.0, 56.0, 55.0, 40.0, 60.0, 55.0],
                )],
            },
            Chart {
                id: "sales".to_string(),
                title: "Sales Overview".to_string(),
                kind: ChartKind::Doughnut,
                labels: to_labels(&["0%", "25%", "50%", "75%"]),
                datasets: vec![Dataset {
                    label: None,
                    data: vec![15.0, 35.0, 25.0, 25.0],
                    colors: ["#6366F1", "#EC4899", "#06B6D4", "#e5e7eb"]
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                }],
            },
        ],
        stats: vec![
            StatsCard {
                title: "Customers".to_string(),
                value: "36,358".to_string(),
                change: "-12%".to_string(),
                accent: Accent::Teal,
                chart_id: Some("customers".to_string()),
            },
            StatsCard {
                title: "Projects".to_string(),
                value: "78,298".to_string(),
                change: "+31.8%".to_string(),
                accent: Accent::Pink,
                chart_id: Some("projects".to_string()),
            },
        ],
        products: to_labels(&["App", "Mobile", "SaaS", "Others"]),
        report_url: DEFAULT_REPORT_URL.to_string(),
    }
}

fn to_labels(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|label| label.to_string()).collect()
}

/// Dashboard errors.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// JSON decode failure.
    #[error("dashboard decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Parsed document violates shape invariants.
    #[error("dashboard contract violation: {0}")]
    InvalidContract(String),
    /// Report URL is malformed or not HTTPS.
    #[error("invalid report url: {0}")]
    InvalidReportUrl(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for dashboard validation and report state.

    use super::*;

    #[test]
    fn built_in_dashboard_is_valid() {
        let dashboard = default_dashboard();
        dashboard.validate().expect("built-in dashboard should validate");
        assert_eq!(dashboard.chart("revenue").map(|c| c.datasets.len()), Some(3));
    }

    #[test]
    fn mismatched_dataset_is_rejected() {
        let mut dashboard = default_dashboard();
        dashboard.charts[1].datasets[0].data.pop();
        assert!(matches!(
            dashboard.validate(),
            Err(DashboardError::InvalidContract(_))
        ));
    }

    #[test]
    fn failed_report_is_not_revived_by_late_load() {
        let mut frame = ReportFrame::new(DEFAULT_REPORT_URL).expect("default url is https");
        frame.on_error();
        frame.on_load();
        assert_eq!(frame.state(), ReportLoadState::Failed);
        assert_eq!(
            frame.fallback_message(),
            Some((REPORT_FAILURE_MESSAGE, REPORT_FAILURE_HINT))
        );
    }

    #[test]
    fn report_url_must_be_https() {
        assert!(ReportFrame::new("http://example.test/report").is_err());
        assert!(ReportFrame::new("not a url").is_err());
    }
}
