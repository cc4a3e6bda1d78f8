//! Content-addressed blob locators.
//!
//! A [`BlobLocator`] names bytes in the blob store by their Blake3 digest,
//! rendered as a `b3://<hex>` URI. Putting identical bytes twice yields the
//! same locator, so locator equality is byte equality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// URI scheme for content-addressed blob locators.
pub const LOCATOR_SCHEME: &str = "b3";

/// A content-addressed locator: the Blake3 digest of the stored bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobLocator(pub [u8; 32]);

impl BlobLocator {
    /// Compute the locator for the given bytes.
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Create from raw digest bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as a `b3://<hex>` URI string.
    pub fn to_uri(&self) -> String {
        format!("{}://{}", LOCATOR_SCHEME, hex::encode(self.0))
    }

    /// Parse from a `b3://<hex>` URI string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let rest = s
            .strip_prefix(LOCATOR_SCHEME)
            .and_then(|r| r.strip_prefix("://"))
            .ok_or_else(|| CoreError::MalformedLocator(format!("expected {LOCATOR_SCHEME}:// scheme: {s:?}")))?;

        let bytes = hex::decode(rest)
            .map_err(|_| CoreError::MalformedLocator(format!("invalid hex digest: {s:?}")))?;
        if bytes.len() != 32 {
            return Err(CoreError::MalformedLocator(format!(
                "digest must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for BlobLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobLocator({})", &hex::encode(self.0)[..16])
    }
}

impl fmt::Display for BlobLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uri())
    }
}

impl FromStr for BlobLocator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
