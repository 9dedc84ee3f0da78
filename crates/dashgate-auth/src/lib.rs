#![warn(missing_docs)]
//! # dashgate-auth
//!
//! ## Purpose
//! Implements the session store that gates the protected dashboard views.
//!
//! ## Responsibilities
//! - Check credentials through an injectable [`Authenticator`].
//! - Model the Anonymous/Authenticated session with explicit transitions.
//! - Persist and restore the session through durable storage.
//!
//! ## Data flow
//! Login form collects credentials -> [`SessionStore::login`] asks the
//! [`Authenticator`] -> on success the [`User`] is persisted and the state
//! becomes [`SessionState::Authenticated`]. On start the shell calls
//! [`SessionStore::check_auth`] to restore a persisted session.
//!
//! ## Ownership and lifetimes
//! The store owns its state and shares storage and the authenticator through
//! `Arc`, so the application container can hand out `&mut SessionStore`
//! without lifetime coupling to either collaborator.
//!
//! ## Error model
//! Authentication failures come back as [`AuthError`] and are also recorded as
//! the visible `error` message. Storage failures are logged and never change
//! the in-memory transition.
//!
//! ## Security and privacy notes
//! Passwords are compared and dropped; they are never persisted or logged.
//! The demo authenticator is a plaintext equality check meant for a demo
//! surface only.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use dashgate_auth::{Credentials, DemoAuthenticator, SessionStore};
//! use dashgate_core::MemoryStore;
//!
//! let mut session = SessionStore::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(DemoAuthenticator::default()),
//! );
//! assert!(session.login(&Credentials::new("demo@example.com", "demo123")).is_ok());
//! assert_eq!(session.user().map(|user| user.name.as_str()), Some("David"));
//! ```

use std::sync::Arc;

pub use dashgate_core::User;
use dashgate_core::{
    KeyValueStore, clear_session_record, read_session_record, write_session_record,
};
use thiserror::Error;

/// Email accepted by [`DemoAuthenticator::default`].
pub const DEMO_EMAIL: &str = "demo@example.com";

/// Password accepted by [`DemoAuthenticator::default`].
pub const DEMO_PASSWORD: &str = "demo123";

/// Display name assigned by [`DemoAuthenticator::default`].
pub const DEMO_DISPLAY_NAME: &str = "David";

/// Message recorded after a rejected login.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// User-provided login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Capability that turns credentials into an identity.
pub trait Authenticator: Send + Sync {
    /// Verifies credentials.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidCredentials`] for a rejected pair, or
    /// [`AuthError::Backend`] when verification itself failed.
    fn authenticate(&self, credentials: &Credentials) -> Result<User, AuthError>;
}

/// Authenticator that accepts exactly one configured credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoAuthenticator {
    email: String,
    password: String,
    display_name: String,
}

impl DemoAuthenticator {
    /// Creates an authenticator for one credential pair.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            display_name: display_name.into(),
        }
    }
}

impl Default for DemoAuthenticator {
    fn default() -> Self {
        Self::new(DEMO_EMAIL, DEMO_PASSWORD, DEMO_DISPLAY_NAME)
    }
}

impl Authenticator for DemoAuthenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<User, AuthError> {
        if credentials.email == self.email && credentials.password == self.password {
            Ok(User::new(credentials.email.clone(), self.display_name.clone()))
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Runtime session state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No user is signed in.
    #[default]
    Anonymous,
    /// A user is signed in.
    Authenticated(User),
}

/// Session store with explicit legal transitions.
#[derive(Clone)]
pub struct SessionStore {
    state: SessionState,
    error: Option<String>,
    storage: Arc<dyn KeyValueStore>,
    authenticator: Arc<dyn Authenticator>,
}

impl SessionStore {
    /// Creates a store in the `Anonymous` state. Storage is not read until
    /// [`SessionStore::check_auth`].
    pub fn new(storage: Arc<dyn KeyValueStore>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            state: SessionState::Anonymous,
            error: None,
            storage,
            authenticator,
        }
    }

    /// Returns current session state snapshot.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns `true` when a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    /// Returns the signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            SessionState::Anonymous => None,
        }
    }

    /// Returns the visible login error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Attempts a login.
    ///
    /// On success the session becomes authenticated, the error is cleared and
    /// the session is persisted. On failure the error message is set and the
    /// current authentication is left as it was.
    ///
    /// # Errors
    /// Returns the authenticator's [`AuthError`].
    pub fn login(&mut self, credentials: &Credentials) -> Result<User, AuthError> {
        match self.authenticator.authenticate(credentials) {
            Ok(user) => {
                if let Err(error) = write_session_record(self.storage.as_ref(), &user) {
                    tracing::warn!(%error, "failed to persist session");
                }
                tracing::info!(email = %user.email, "login succeeded");
                self.state = SessionState::Authenticated(user.clone());
                self.error = None;
                Ok(user)
            }
            Err(error) => {
                tracing::info!(email = %credentials.email, %error, "login rejected");
                self.error = Some(error.visible_message());
                Err(error)
            }
        }
    }

    /// Signs out and removes the persisted session.
    pub fn logout(&mut self) {
        if let Err(error) = clear_session_record(self.storage.as_ref()) {
            tracing::warn!(%error, "failed to clear persisted session");
        }
        if self.is_authenticated() {
            tracing::info!("logged out");
        }
        self.state = SessionState::Anonymous;
    }

    /// Restores a persisted session when one is present.
    ///
    /// Missing or unreadable storage leaves the state untouched. Calling this
    /// repeatedly has the same effect as calling it once.
    pub fn check_auth(&mut self) -> bool {
        match read_session_record(self.storage.as_ref()) {
            Ok(Some(user)) => {
                if self.user() != Some(&user) {
                    tracing::debug!(email = %user.email, "restored persisted session");
                }
                self.state = SessionState::Authenticated(user);
                true
            }
            Ok(None) => false,
            Err(error) => {
                tracing::warn!(%error, "ignoring unreadable persisted session");
                false
            }
        }
    }

    /// Clears the visible login error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Errors produced by authentication.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Email/password pair was rejected.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// Verification could not be carried out.
    #[error("authentication backend failure: {0}")]
    Backend(String),
}

impl AuthError {
    /// Message shown on the login form.
    pub fn visible_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            AuthError::Backend(message) => message.clone(),
        }
    }
}
