#![warn(missing_docs)]
//! # dashgate-core
//!
//! ## Purpose
//! Defines the durable key-value storage boundary and the typed records that
//! cross it.
//!
//! ## Responsibilities
//! - Abstract origin-scoped durable storage behind [`KeyValueStore`].
//! - Provide an in-memory store and a JSON-file-backed store.
//! - Encode/decode the persisted session and theme records with explicit
//!   parse failures.
//!
//! ## Data flow
//! Session and theme stores call the typed helpers ([`write_session_record`],
//! [`read_theme`], ...) which translate between domain values and the raw
//! string values held by a [`KeyValueStore`].
//!
//! ## Ownership and lifetimes
//! Stores are shared as `Arc<dyn KeyValueStore>`; implementations use interior
//! mutability so readers and writers only need `&self`.
//!
//! ## Error model
//! I/O and JSON failures are returned as [`CoreError`]. Callers decide whether
//! to fail closed; nothing in this crate panics on bad persisted data.
//!
//! ## Security and privacy notes
//! Only the authenticated flag and the public user profile are persisted.
//! Passwords never reach storage.
//!
//! ## Example
//! ```rust
//! use dashgate_core::{MemoryStore, User, read_session_record, write_session_record};
//!
//! let store = MemoryStore::new();
//! let user = User::new("demo@example.com", "David");
//! write_session_record(&store, &user).unwrap();
//! assert_eq!(read_session_record(&store).unwrap(), Some(user));
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key holding the `"true"` authenticated marker.
pub const STORAGE_KEY_AUTHENTICATED: &str = "isAuthenticated";

/// Storage key holding the JSON-encoded [`User`] record.
pub const STORAGE_KEY_USER: &str = "user";

/// Storage key holding `"dark"` or `"light"`.
pub const STORAGE_KEY_THEME: &str = "theme";

const AUTHENTICATED_MARKER: &str = "true";

/// Public identity of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login email address.
    pub email: String,
    /// Display name shown in the navbar and welcome card.
    pub name: String,
}

impl User {
    /// Creates a user record.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Display mode persisted under [`STORAGE_KEY_THEME`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Light palette.
    Light,
    /// Dark palette.
    Dark,
}

impl ThemeMode {
    /// Returns the raw storage value.
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Parses a raw storage value. Anything other than `dark`/`light` is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "dark" => Some(ThemeMode::Dark),
            "light" => Some(ThemeMode::Light),
            _ => None,
        }
    }

    /// Returns `true` for [`ThemeMode::Dark`].
    pub fn is_dark(self) -> bool {
        self == ThemeMode::Dark
    }

    /// Returns the opposite mode.
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

/// Origin-scoped durable string storage.
///
/// Writes are synchronous and best-effort; there is no transaction or retry.
pub trait KeyValueStore: Send + Sync {
    /// Reads one value.
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Writes one value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Removes one value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

/// Process-local store. Contents do not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns `true` when no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let entries = self.entries.lock().map_err(|_| CoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().map_err(|_| CoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().map_err(|_| CoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// The whole map is rewritten on every mutation. A missing file is treated as
/// an empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`.
    ///
    /// # Errors
    /// Returns [`CoreError::Io`] when the file exists but cannot be read.
    /// Returns [`CoreError::Codec`] when the file is not a JSON string map.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(CoreError::Codec)?,
            Err(error) if error.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(error) => return Err(CoreError::Io(error)),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Creates an empty store at `path`, discarding whatever the file holds on
    /// the next write.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_vec_pretty(entries)?;
        fs::write(&self.path, encoded)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let entries = self.entries.lock().map_err(|_| CoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().map_err(|_| CoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().map_err(|_| CoreError::Poisoned)?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

/// Persists the authenticated marker and the user record.
///
/// # Errors
/// Returns the first storage failure. The marker may already be written when
/// the user write fails.
pub fn write_session_record(store: &dyn KeyValueStore, user: &User) -> Result<(), CoreError> {
    let encoded = serde_json::to_string(user)?;
    store.set(STORAGE_KEY_AUTHENTICATED, AUTHENTICATED_MARKER)?;
    store.set(STORAGE_KEY_USER, &encoded)?;
    Ok(())
}

/// Reads the persisted session.
///
/// Returns `Ok(None)` unless the marker is exactly `"true"` and a user record
/// is present.
///
/// # Errors
/// Returns [`CoreError::Codec`] when the user record is not valid JSON for
/// [`User`], and storage errors as-is.
pub fn read_session_record(store: &dyn KeyValueStore) -> Result<Option<User>, CoreError> {
    let marker = store.get(STORAGE_KEY_AUTHENTICATED)?;
    if marker.as_deref() != Some(AUTHENTICATED_MARKER) {
        return Ok(None);
    }

    match store.get(STORAGE_KEY_USER)? {
        Some(raw) if !raw.is_empty() => {
            let user = serde_json::from_str(&raw)?;
            Ok(Some(user))
        }
        _ => Ok(None),
    }
}

/// Removes both session keys.
///
/// # Errors
/// Returns the first storage failure; the second key is still attempted.
pub fn clear_session_record(store: &dyn KeyValueStore) -> Result<(), CoreError> {
    let marker = store.remove(STORAGE_KEY_AUTHENTICATED);
    let user = store.remove(STORAGE_KEY_USER);
    marker.and(user)
}

/// Reads the persisted theme. Unknown values read as `None`.
///
/// # Errors
/// Returns storage errors as-is.
pub fn read_theme(store: &dyn KeyValueStore) -> Result<Option<ThemeMode>, CoreError> {
    Ok(store
        .get(STORAGE_KEY_THEME)?
        .as_deref()
        .and_then(ThemeMode::parse))
}

/// Persists the theme.
///
/// # Errors
/// Returns storage errors as-is.
pub fn write_theme(store: &dyn KeyValueStore, mode: ThemeMode) -> Result<(), CoreError> {
    store.set(STORAGE_KEY_THEME, mode.as_str())
}

/// Error type for storage and codec failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Filesystem failure in a durable store.
    #[error("storage io failure: {0}")]
    Io(#[from] std::io::Error),
    /// Persisted value could not be encoded or decoded.
    #[error("storage codec failure: {0}")]
    Codec(#[from] serde_json::Error),
    /// A previous writer panicked while holding the store lock.
    #[error("storage lock poisoned")]
    Poisoned,
}
