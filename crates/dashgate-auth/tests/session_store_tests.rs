//! Integration tests for session store login, logout and restore.

use std::sync::Arc;

use dashgate_auth::{
    AuthError, Credentials, DEMO_EMAIL, DEMO_PASSWORD, DemoAuthenticator, SessionState,
    SessionStore,
};
use dashgate_core::{KeyValueStore, MemoryStore, STORAGE_KEY_AUTHENTICATED, STORAGE_KEY_USER};

fn session_over(storage: &Arc<MemoryStore>) -> SessionStore {
    SessionStore::new(storage.clone(), Arc::new(DemoAuthenticator::default()))
}

#[test]
fn session_store_tests_reject_every_other_pair() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = session_over(&storage);

    let attempts = [
        ("demo@example.com", "demo124"),
        ("demo@example.com", ""),
        ("DEMO@example.com", "demo123"),
        ("demo@example.com ", "demo123"),
        ("", ""),
        ("someone@example.com", "demo123"),
    ];
    for (email, password) in attempts {
        let result = session.login(&Credentials::new(email, password));
        assert_eq!(result, Err(AuthError::InvalidCredentials));
        assert!(!session.is_authenticated());
        assert!(session.error().is_some_and(|message| !message.is_empty()));
    }
    assert!(storage.is_empty());
}

#[test]
fn session_store_tests_demo_login_persists_both_keys() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = session_over(&storage);

    let user = session
        .login(&Credentials::new(DEMO_EMAIL, DEMO_PASSWORD))
        .expect("demo credentials should be accepted");

    assert!(session.is_authenticated());
    assert_eq!(user.name, "David");
    assert_eq!(session.user().map(|user| user.email.as_str()), Some(DEMO_EMAIL));
    assert_eq!(session.error(), None);
    assert_eq!(
        storage.get(STORAGE_KEY_AUTHENTICATED).unwrap().as_deref(),
        Some("true")
    );
    let raw_user = storage.get(STORAGE_KEY_USER).unwrap().expect("user should be stored");
    let stored: serde_json::Value = serde_json::from_str(&raw_user).unwrap();
    assert_eq!(stored["email"], DEMO_EMAIL);
    assert_eq!(stored["name"], "David");
}

#[test]
fn session_store_tests_successful_login_clears_previous_error() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = session_over(&storage);

    let _ = session.login(&Credentials::new(DEMO_EMAIL, "nope"));
    assert!(session.error().is_some());
    session
        .login(&Credentials::new(DEMO_EMAIL, DEMO_PASSWORD))
        .unwrap();
    assert_eq!(session.error(), None);
}

#[test]
fn session_store_tests_logout_clears_storage() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = session_over(&storage);
    session
        .login(&Credentials::new(DEMO_EMAIL, DEMO_PASSWORD))
        .unwrap();

    session.logout();

    assert_eq!(session.state(), &SessionState::Anonymous);
    assert_eq!(session.user(), None);
    assert_eq!(storage.get(STORAGE_KEY_AUTHENTICATED).unwrap(), None);
    assert_eq!(storage.get(STORAGE_KEY_USER).unwrap(), None);
}

#[test]
fn session_store_tests_check_auth_without_storage_stays_anonymous() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = session_over(&storage);

    assert!(!session.check_auth());
    assert!(!session.check_auth());
    assert_eq!(session.state(), &SessionState::Anonymous);
}

#[test]
fn session_store_tests_check_auth_restores_same_user() {
    let storage = Arc::new(MemoryStore::new());
    let mut first = session_over(&storage);
    let user = first
        .login(&Credentials::new(DEMO_EMAIL, DEMO_PASSWORD))
        .unwrap();

    let mut reloaded = session_over(&storage);
    assert!(!reloaded.is_authenticated());
    assert!(reloaded.check_auth());
    assert!(reloaded.check_auth());

    assert_eq!(reloaded.user(), Some(&user));
}

#[test]
fn session_store_tests_clear_error_resets_message() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = session_over(&storage);
    let _ = session.login(&Credentials::new("x", "y"));

    session.clear_error();

    assert_eq!(session.error(), None);
}
