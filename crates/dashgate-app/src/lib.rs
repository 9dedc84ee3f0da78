#![warn(missing_docs)]
//! # dashgate-app
//!
//! ## Purpose
//! Wires the session, theme, dashboard, upload and routing crates into one
//! application-state container driven by the terminal shell.
//!
//! ## Responsibilities
//! - Own every store explicitly; views receive `&AppState`, never globals.
//! - Route every path through the guard and manage page-scoped state (the
//!   upload form, the report frame) as views are entered and left.
//! - Open durable storage, configure logging, and redact secrets from log
//!   text.
//!
//! ## Data flow
//! Shell command -> [`AppState`] operation -> session/theme/upload transition
//! -> [`AppState::navigate`] re-resolves the view -> [`project_shell`] gives
//! the shell a flat snapshot to render.
//!
//! ## Ownership and lifetimes
//! `AppState` owns the stores; storage and collaborators are shared through
//! `Arc` so tests can keep a handle to the same instances.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Nothing here is fatal to
//! the shell: bad storage falls back to an empty store and bad dashboard files
//! fall back to the built-in dashboard at the call site.
//!
//! ## Security and privacy notes
//! - Protected views are unreachable without a session.
//! - Passwords are never logged; [`redact_sensitive`] strips secret markers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashgate_auth::{AuthError, Authenticator, Credentials, SessionStore};
use dashgate_core::{CoreError, FileStore, KeyValueStore, MemoryStore, ThemeMode};
use dashgate_dashboard::{
    ChartPalette, Dashboard, DashboardError, ProductTabs, ReportFrame, parse_dashboard,
};
use dashgate_ui::{LayoutState, Navigation, Route, ThemeStore, UiError, View, navigate};
use dashgate_upload::{UploadBackend, UploadController, UploadError};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("DASHGATE_VERSION");

/// Storage file name inside the data directory.
pub const STORAGE_FILE_NAME: &str = "storage.json";

/// Default tracing filter when neither `--log-filter` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "dashgate=info";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Runtime configuration resolved by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the storage file.
    pub data_dir: PathBuf,
    /// Ambient theme used until the user toggles.
    pub system_theme: ThemeMode,
    /// Seed for preview handle generation.
    pub preview_seed: u64,
    /// Optional dashboard document replacing the built-in one.
    pub dashboard_file: Option<PathBuf>,
}

impl AppConfig {
    /// Path of the durable storage file.
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE_NAME)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".dashgate"),
            system_theme: ThemeMode::Light,
            preview_seed: 0,
            dashboard_file: None,
        }
    }
}

/// Parses an ambient theme signal. Anything but `dark` means light.
pub fn parse_system_theme(raw: &str) -> ThemeMode {
    if raw.trim().eq_ignore_ascii_case("dark") {
        ThemeMode::Dark
    } else {
        ThemeMode::Light
    }
}

/// Opens the durable store, starting empty when the file is corrupt.
///
/// # Errors
/// Returns [`AppError::Storage`] only when the file exists but cannot be read.
pub fn open_storage(path: &Path) -> Result<Arc<dyn KeyValueStore>, AppError> {
    match FileStore::open(path) {
        Ok(store) => Ok(Arc::new(store)),
        Err(CoreError::Codec(error)) => {
            tracing::warn!(path = %path.display(), %error, "storage file is corrupt; starting empty");
            Ok(Arc::new(FileStore::empty(path)))
        }
        Err(error) => Err(AppError::Storage(error)),
    }
}

/// Loads the dashboard document, or the built-in one when `path` is `None`.
///
/// # Errors
/// Returns [`AppError::DashboardFile`] when the file cannot be read, and
/// [`AppError::Dashboard`] when it does not parse.
pub fn load_dashboard(path: Option<&Path>) -> Result<Dashboard, AppError> {
    let Some(path) = path else {
        return Ok(dashgate_dashboard::default_dashboard());
    };
    let raw = std::fs::read_to_string(path).map_err(|error| {
        AppError::DashboardFile(format!("{}: {error}", path.display()))
    })?;
    Ok(parse_dashboard(&raw)?)
}

/// Installs the global tracing subscriber.
///
/// `filter` wins over `RUST_LOG`; both fall back to [`DEFAULT_LOG_FILTER`].
/// Calling this twice is harmless.
pub fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Application-state container.
pub struct AppState {
    session: SessionStore,
    theme: ThemeStore,
    layout: LayoutState,
    navigation: Navigation,
    dashboard: Dashboard,
    products: ProductTabs,
    report: ReportFrame,
    upload: Option<UploadController>,
    upload_backend: Arc<dyn UploadBackend>,
    preview_seed: u64,
    upload_visits: u64,
}

impl AppState {
    /// Builds the container, restores any persisted session and renders `/`.
    ///
    /// # Errors
    /// Returns [`AppError::Dashboard`] when the dashboard's report URL is
    /// invalid.
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        authenticator: Arc<dyn Authenticator>,
        upload_backend: Arc<dyn UploadBackend>,
        dashboard: Dashboard,
        config: &AppConfig,
    ) -> Result<Self, AppError> {
        let mut session = SessionStore::new(storage.clone(), authenticator);
        session.check_auth();
        let theme = ThemeStore::load(storage, config.system_theme);
        let report = ReportFrame::new(&dashboard.report_url)?;
        let products = ProductTabs::new(dashboard.products.clone());
        let navigation = navigate(Route::Root.path(), session.is_authenticated())?;

        let mut state = Self {
            session,
            theme,
            layout: LayoutState::default(),
            navigation: Navigation {
                view: View::Login,
                path: Route::Login.path(),
                redirects: Vec::new(),
            },
            dashboard,
            products,
            report,
            upload: None,
            upload_backend,
            preview_seed: config.preview_seed,
            upload_visits: 0,
        };
        state.enter(navigation);
        Ok(state)
    }

    /// In-memory container with the demo authenticator and simulated uploads.
    pub fn in_memory(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(dashgate_auth::DemoAuthenticator::default()),
            Arc::new(dashgate_upload::SimulatedBackend::default()),
            dashgate_dashboard::default_dashboard(),
            config,
        )
    }

    /// Routes to `path`, following guard redirects.
    ///
    /// # Errors
    /// Returns [`AppError::Ui`] if redirects do not settle.
    pub fn navigate(&mut self, path: &str) -> Result<&Navigation, AppError> {
        self.session.check_auth();
        let next = navigate(path, self.session.is_authenticated())?;
        self.enter(next);
        Ok(&self.navigation)
    }

    /// Re-applies the guard to the current path, e.g. after a session change.
    ///
    /// # Errors
    /// Returns [`AppError::Ui`] if redirects do not settle.
    pub fn refresh(&mut self) -> Result<&Navigation, AppError> {
        let current = self.navigation.path;
        self.navigate(current)
    }

    fn enter(&mut self, next: Navigation) {
        let previous = self.navigation.view;
        self.layout.on_navigate();

        if previous != next.view {
            match previous {
                View::Upload => {
                    if let Some(mut form) = self.upload.take() {
                        form.teardown();
                    }
                }
                View::Login => self.session.clear_error(),
                View::Dashboard => {}
            }

            match next.view {
                View::Upload => {
                    self.upload_visits += 1;
                    let seed = self.preview_seed.wrapping_add(self.upload_visits);
                    self.upload = Some(UploadController::new(self.upload_backend.clone(), seed));
                }
                View::Dashboard => {
                    self.products = ProductTabs::new(self.dashboard.products.clone());
                    if let Ok(report) = ReportFrame::new(&self.dashboard.report_url) {
                        self.report = report;
                    }
                }
                View::Login => {}
            }
        }

        tracing::debug!(path = next.path, view = ?next.view, "view entered");
        self.navigation = next;
    }

    /// Attempts a login and, on success, moves to the dashboard.
    ///
    /// # Errors
    /// Returns [`AppError::Auth`] when the credentials are rejected; the
    /// visible message is on [`AppState::login_error`].
    pub fn login(&mut self, email: &str, password: &str) -> Result<&Navigation, AppError> {
        self.session.login(&Credentials::new(email, password))?;
        self.navigate(Route::Dashboard.path())
    }

    /// Signs out and re-guards the current path.
    ///
    /// # Errors
    /// Returns [`AppError::Ui`] if redirects do not settle.
    pub fn logout(&mut self) -> Result<&Navigation, AppError> {
        self.session.logout();
        self.layout.profile_menu_open = false;
        self.refresh()
    }

    /// Flips the display theme.
    pub fn toggle_theme(&mut self) -> ThemeMode {
        self.theme.toggle()
    }

    /// Toggles the mobile sidebar.
    pub fn toggle_sidebar(&mut self) {
        self.layout.toggle_mobile_menu();
    }

    /// Toggles the profile dropdown.
    pub fn toggle_profile_menu(&mut self) {
        self.layout.toggle_profile_menu();
    }

    /// Activates a product tab.
    pub fn select_product(&mut self, index: usize) -> bool {
        self.products.select(index)
    }

    /// Embedded report load event.
    pub fn report_loaded(&mut self) {
        self.report.on_load();
    }

    /// Embedded report error event.
    pub fn report_failed(&mut self) {
        self.report.on_error();
    }

    /// Advances time-driven state.
    pub fn tick(&mut self, now_ms: u64) {
        if let Some(form) = self.upload.as_mut() {
            form.on_tick(now_ms);
        }
    }

    /// Releases page-scoped resources before exit.
    pub fn shutdown(&mut self) {
        if let Some(mut form) = self.upload.take() {
            form.teardown();
        }
    }

    /// Current route.
    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// Session store.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Visible login error.
    pub fn login_error(&self) -> Option<&str> {
        self.session.error()
    }

    /// Theme store.
    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    /// Chart colors for the active theme.
    pub fn palette(&self) -> ChartPalette {
        ChartPalette::for_theme(self.theme.is_dark_mode())
    }

    /// Layout menus.
    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    /// Dashboard document.
    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Product tabs.
    pub fn products(&self) -> &ProductTabs {
        &self.products
    }

    /// Embedded report frame.
    pub fn report(&self) -> &ReportFrame {
        &self.report
    }

    /// Upload form, present only while the upload view is shown.
    pub fn upload(&self) -> Option<&UploadController> {
        self.upload.as_ref()
    }

    /// Mutable upload form, present only while the upload view is shown.
    pub fn upload_mut(&mut self) -> Option<&mut UploadController> {
        self.upload.as_mut()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("session", &self.session)
            .field("theme", &self.theme)
            .field("navigation", &self.navigation)
            .field("upload", &self.upload)
            .finish_non_exhaustive()
    }
}

/// Flat snapshot of the shell chrome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellStatus {
    /// Current canonical path.
    pub path: &'static str,
    /// Current view.
    pub view: View,
    /// Signed-in user's display name.
    pub user_name: Option<String>,
    /// Active theme.
    pub theme: ThemeMode,
    /// Label of the highlighted sidebar link.
    pub active_link: Option<&'static str>,
    /// Whether the mobile sidebar is open.
    pub sidebar_open: bool,
    /// Whether an upload is in flight.
    pub uploading: bool,
}

/// Projects the container into a flat status snapshot.
pub fn project_shell(state: &AppState) -> ShellStatus {
    let navigation = state.navigation();
    ShellStatus {
        path: navigation.path,
        view: navigation.view,
        user_name: state.session().user().map(|user| user.name.clone()),
        theme: state.theme().mode(),
        active_link: dashgate_ui::active_link(navigation.path).map(|link| link.name),
        sidebar_open: state.layout().mobile_menu_open,
        uploading: state.upload().is_some_and(UploadController::is_submitting),
    }
}

/// Redacts common secret markers in log-safe output.
///
/// Everything after the first `password`, `token`, `secret` or `authorization`
/// marker is replaced.
pub fn redact_sensitive(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let first_marker = ["password", "token", "secret", "authorization"]
        .iter()
        .filter_map(|key| lower.find(key).map(|position| (position, *key)))
        .min_by_key(|(position, _)| *position);

    match first_marker {
        Some((position, key)) => format!("{}{key}=<redacted>", &input[..position]),
        None => input.to_string(),
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failure.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
    /// Durable storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] CoreError),
    /// Upload failure.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
    /// Dashboard document failure.
    #[error("dashboard error: {0}")]
    Dashboard(#[from] DashboardError),
    /// Dashboard document could not be read.
    #[error("dashboard file error: {0}")]
    DashboardFile(String),
    /// Terminal read/write failure.
    #[error("terminal io error: {0}")]
    Io(#[from] std::io::Error),
    /// Routing failure.
    #[error("routing error: {0}")]
    Ui(#[from] UiError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration helpers and container wiring.

    use super::*;

    #[test]
    fn storage_path_lives_under_data_dir() {
        let config = AppConfig {
            data_dir: PathBuf::from("/tmp/dashgate-data"),
            ..AppConfig::default()
        };
        assert_eq!(
            config.storage_path(),
            PathBuf::from("/tmp/dashgate-data/storage.json")
        );
    }

    #[test]
    fn system_theme_seeds_unset_preference() {
        let config = AppConfig {
            system_theme: ThemeMode::Dark,
            ..AppConfig::default()
        };
        let state = AppState::in_memory(&config).expect("in-memory app should build");

        assert!(state.theme().is_dark_mode());
        assert_eq!(state.palette().grid, "#374151");
    }

    #[test]
    fn logout_closes_profile_menu() {
        let mut state = AppState::in_memory(&AppConfig::default()).unwrap();
        state.login("demo@example.com", "demo123").unwrap();
        state.toggle_profile_menu();

        state.logout().unwrap();

        assert!(!state.layout().profile_menu_open);
        assert_eq!(state.navigation().view, View::Login);
    }

    #[test]
    fn redaction_is_case_insensitive() {
        assert_eq!(redact_sensitive("X-Token: abc"), "X-token=<redacted>");
    }
}
