//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur at the blob-store or registry boundary.
///
/// These are transport-level failures. Expected steady-state conditions
/// (an absent entry, a pending anchor, a missing blob) are modeled as
/// outcome values, not errors, so callers can retry transport failures
/// without masking a real `Absent`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend failure (connection loss, backend-specific fault).
    #[error("backend error: {0}")]
    Backend(String),

    /// Record serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid data returned by a backend.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
