//! Error types for provenir-core.

use thiserror::Error;

/// Core errors that can occur during manifest and canonicalization operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("signer does not match declared claimant: recovered {recovered}, declared {declared}")]
    ClaimantMismatch { recovered: String, declared: String },

    #[error("non-integer number in manifest: {0}")]
    UnsupportedNumber(String),

    #[error("null is not permitted in a manifest")]
    NullValue,

    #[error("unsupported manifest version: {0}")]
    UnsupportedVersion(u64),

    #[error("malformed manifest: {0}")]
    MalformedManifest(String),

    #[error("malformed locator: {0}")]
    MalformedLocator(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Errors from platform locator normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("invalid platform name: {0:?}")]
    InvalidPlatform(String),

    #[error("empty locator")]
    EmptyLocator,

    #[error("unrecognized {platform} locator format: {input:?}")]
    UnrecognizedFormat { platform: String, input: String },
}
