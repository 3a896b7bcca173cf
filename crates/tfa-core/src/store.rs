//! Boundary contracts the host must supply.
//!
//! The engine is synchronous per attempt with no internal suspension
//! points, so these traits are synchronous as well; a host backed by an
//! async store bridges at its own edge.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::{FloodWindow, PluginId, TfaError, TfaPlugin, UserId};

/// An error resulting from host-side storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An internal unspecified error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A serialization or deserialization error.
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// The minimum the engine needs to know about a user.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Host-defined identifier.
    pub id: UserId,
    /// False for blocked or disabled accounts.
    pub active: bool,
    /// Assigned role names.
    pub roles: Vec<String>,
    /// Timestamp of the last completed authentication.
    pub last_login: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Whether the user holds `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// User lookup by identifier.
pub trait UserLookup: Send + Sync {
    /// Fetch a user record, `None` when unknown.
    fn user(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError>;
}

/// Per-user key-value storage, keyed by `(user, namespace)`.
///
/// Holds stored secrets (one namespace per plugin), skip counters and
/// arbitrary plugin auxiliary data. Read-modify-write; not transactional.
pub trait UserDataStore: Send + Sync {
    /// Fetch a value.
    fn get(&self, user: &UserId, namespace: &str, key: &str) -> Result<Option<Value>, StoreError>;
    /// Store a value.
    fn set(&self, user: &UserId, namespace: &str, key: &str, value: Value)
        -> Result<(), StoreError>;
    /// Remove a value if present.
    fn remove(&self, user: &UserId, namespace: &str, key: &str) -> Result<(), StoreError>;
}

/// Rate-limit backend keyed by an identifier string and a window.
pub trait FloodBackend: Send + Sync {
    /// Whether another attempt is allowed within the window.
    fn is_allowed(&self, id: &str, window: &FloodWindow) -> bool;
    /// Record one attempt against the identifier.
    fn register(&self, id: &str, window: &FloodWindow);
}

/// Instantiates fresh per-attempt plugin objects.
///
/// Plugins are stateful within an attempt (accumulated errors, consumed
/// one-time codes), so the engine owns its instances outright and asks the
/// factory for new ones per attempt.
pub trait PluginFactory: Send + Sync {
    /// Create the plugin registered under `id`, bound to `user`. `None`
    /// when no such plugin is registered.
    fn create(&self, id: &PluginId, user: &UserId)
        -> Result<Option<Box<dyn TfaPlugin>>, TfaError>;
}
