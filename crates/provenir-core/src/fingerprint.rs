//! Content fingerprints: deterministic digests over exact byte content.
//!
//! A fingerprint commits to the bytes of a work, nothing else. No
//! normalization, no encoding detection, no locale dependence. Identical
//! bytes produce an identical fingerprint on every platform.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte Blake3 fingerprint of exact content bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Compute the fingerprint of the given content bytes.
    ///
    /// Total over any byte sequence, including empty input.
    pub fn of(content: &[u8]) -> Self {
        Self(*blake3::hash(content).as_bytes())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The zero fingerprint (sentinel value).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let data = b"the same bytes";
        assert_eq!(Fingerprint::of(data), Fingerprint::of(data));
    }

    #[test]
    fn test_fingerprint_empty_input() {
        let fp = Fingerprint::of(b"");
        assert_ne!(fp, Fingerprint::ZERO);
        assert_eq!(fp, Fingerprint::of(&[]));
    }

    #[test]
    fn test_fingerprint_single_byte_change() {
        let a = Fingerprint::of(b"hello world");
        let b = Fingerprint::of(b"hello worlD");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_hex_roundtrip() {
        let fp = Fingerprint::of(b"roundtrip");
        let recovered = Fingerprint::from_hex(&fp.to_hex()).unwrap();
        assert_eq!(fp, recovered);
    }

    #[test]
    fn test_fingerprint_rejects_short_hex() {
        assert!(Fingerprint::from_hex("abcd").is_err());
    }

    proptest! {
        #[test]
        fn prop_fingerprint_stable(content in prop::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(Fingerprint::of(&content), Fingerprint::of(&content));
        }

        #[test]
        fn prop_hex_roundtrip(bytes in any::<[u8; 32]>()) {
            let fp = Fingerprint::from_bytes(bytes);
            prop_assert_eq!(Fingerprint::from_hex(&fp.to_hex()).unwrap(), fp);
        }
    }
}
