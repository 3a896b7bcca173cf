use thiserror::Error;

/// Errors from the secret codec.
///
/// Only the write path surfaces errors; [`crate::decrypt`] deliberately
/// collapses every failure into an absent result so that callers treat an
/// unreadable secret as "not available" rather than as a fault.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The supplied key material is not exactly 32 bytes.
    #[error("Invalid key length")]
    InvalidKeyLength,

    /// Serializing the versioned secret record failed.
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
