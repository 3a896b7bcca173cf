//! Errors that can occur when using this crate.
//!
//! Only genuinely exceptional conditions live here. A wrong code, an
//! undecryptable secret, an exhausted skip allowance or a hit flood limit
//! are expected outcomes and surface as values (`bool`, `Option`, message
//! vectors), never as errors.

use thiserror::Error;

use crate::{PluginId, StoreError, UserId};

/// Fail-fast errors from engine construction and the service surface.
///
/// On any of these the host must fall back to "second factor not
/// required" rather than blocking the login indefinitely.
#[derive(Debug, Error)]
pub enum TfaError {
    /// No validator is configured, or none is ready and no fallback
    /// exists.
    #[error("No usable validator is configured")]
    NoValidator,

    /// A validator identifier from configuration is not registered.
    #[error("Unknown validator: {0}")]
    UnknownValidator(PluginId),

    /// The plugin selected as active validator lacks the validation
    /// capability.
    #[error("Plugin {0} does not declare the validation capability")]
    NotAValidator(PluginId),

    /// The plugin handed to the setup engine lacks the setup capability.
    #[error("Plugin {0} does not declare the setup capability")]
    NotSetupCapable(PluginId),

    /// The user under authentication does not exist.
    #[error("Unknown user: {0}")]
    UserNotFound(UserId),

    /// Host-side storage failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Encrypting a secret for storage failed.
    #[error(transparent)]
    Crypto(#[from] tfa_crypto::CryptoError),
}
