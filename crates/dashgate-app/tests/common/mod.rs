//! Shared fixtures for app integration tests.

use std::sync::Arc;

use dashgate_app::{AppConfig, AppState};
use dashgate_auth::DemoAuthenticator;
use dashgate_core::MemoryStore;
use dashgate_dashboard::default_dashboard;
use dashgate_upload::SimulatedBackend;

/// Builds an app over a shared in-memory store.
#[allow(dead_code)]
pub fn app_over(storage: &Arc<MemoryStore>) -> AppState {
    AppState::new(
        storage.clone(),
        Arc::new(DemoAuthenticator::default()),
        Arc::new(SimulatedBackend::default()),
        default_dashboard(),
        &AppConfig::default(),
    )
    .expect("app fixture should build")
}

/// Builds an app that is already signed in with the demo account.
#[allow(dead_code)]
pub fn signed_in_app() -> (Arc<MemoryStore>, AppState) {
    let storage = Arc::new(MemoryStore::new());
    let mut app = app_over(&storage);
    app.login("demo@example.com", "demo123")
        .expect("demo login should succeed");
    (storage, app)
}
