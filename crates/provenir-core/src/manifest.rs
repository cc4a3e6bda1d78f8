//! Manifests: signed claim documents binding a fingerprint to a claimant.
//!
//! A manifest is immutable once signed. Metadata changes are represented
//! as new manifests, never edits.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::canonical::{
    canonical_manifest_bytes, decode_manifest, signed_manifest_bytes, validate_value,
};
use crate::crypto::{recover_signer, ClaimSignature, Claimant};
use crate::error::CoreError;
use crate::fingerprint::Fingerprint;
use crate::locator::BlobLocator;

/// The current manifest schema version.
pub const MANIFEST_VERSION: u8 = 0;

/// The unsigned fields of a claim manifest.
///
/// `created_at` is set once at build time and is informational only; the
/// ledger's `anchored_at` is authoritative for ordering claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Schema version (currently 0).
    pub version: u8,

    /// The content fingerprint this manifest claims.
    pub fingerprint: Fingerprint,

    /// Pointer to the raw content in the blob store. Absent in privacy
    /// mode, where only the fingerprint is disclosed.
    pub content_locator: Option<BlobLocator>,

    /// Builder-claimed creation time (Unix ms). Untrusted.
    pub created_at: i64,

    /// The identity making the claim.
    pub claimant: Claimant,

    /// Open key/value metadata: title, description, tags, license,
    /// custom fields. Integers, strings, booleans, arrays, and nested
    /// objects; no floats, no nulls.
    pub metadata: BTreeMap<String, Value>,
}

impl Manifest {
    /// The canonical bytes to be signed: every field except the signature.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CoreError> {
        canonical_manifest_bytes(self)
    }

    /// Attach a signature, producing a signed manifest.
    ///
    /// No verification happens here; the signature is whatever the signer
    /// capability returned. See [`SignedManifest::verify`].
    pub fn into_signed(self, signature: ClaimSignature) -> SignedManifest {
        SignedManifest {
            manifest: self,
            signature,
        }
    }
}

/// A manifest plus the claimant signature over its canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedManifest {
    /// The signed fields.
    pub manifest: Manifest,

    /// Signature over `manifest.canonical_bytes()`.
    pub signature: ClaimSignature,
}

impl SignedManifest {
    /// Recover the signer from the canonical bytes and check it matches
    /// the manifest's declared claimant.
    ///
    /// Returns the recovered claimant on success. Distinguishes a bad
    /// signature ([`CoreError::InvalidSignature`]) from a valid signature
    /// by the wrong key ([`CoreError::ClaimantMismatch`]).
    pub fn verify(&self) -> Result<Claimant, CoreError> {
        let canonical = self.manifest.canonical_bytes()?;
        let recovered = recover_signer(&canonical, &self.signature)?;
        if recovered != self.manifest.claimant {
            return Err(CoreError::ClaimantMismatch {
                recovered: recovered.to_hex(),
                declared: self.manifest.claimant.to_hex(),
            });
        }
        Ok(recovered)
    }

    /// Encode as a canonical JSON document for blob-store exchange.
    pub fn to_json(&self) -> Result<Vec<u8>, CoreError> {
        signed_manifest_bytes(self)
    }

    /// Decode from a JSON document. Field order in the input is not
    /// trusted; canonical bytes are always re-derived.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CoreError> {
        decode_manifest(bytes)
    }
}

/// Builder for creating manifests.
pub struct ManifestBuilder {
    fingerprint: Fingerprint,
    claimant: Claimant,
    content_locator: Option<BlobLocator>,
    created_at: i64,
    metadata: BTreeMap<String, Value>,
}

impl ManifestBuilder {
    /// Start building a manifest for a fingerprint and claimant.
    pub fn new(fingerprint: Fingerprint, claimant: Claimant) -> Self {
        Self {
            fingerprint,
            claimant,
            content_locator: None,
            created_at: 0,
            metadata: BTreeMap::new(),
        }
    }

    /// Point at the published content in the blob store.
    pub fn content_locator(mut self, locator: BlobLocator) -> Self {
        self.content_locator = Some(locator);
        self
    }

    /// Set the creation timestamp (Unix ms).
    pub fn created_at(mut self, ms: i64) -> Self {
        self.created_at = ms;
        self
    }

    /// Add one metadata entry.
    pub fn metadata_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Replace the whole metadata map.
    pub fn metadata(mut self, metadata: BTreeMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Validate and build the unsigned manifest.
    ///
    /// Rejects metadata outside the canonical subset (floats, nulls) so
    /// the failure happens here rather than at signing time.
    pub fn build(self) -> Result<Manifest, CoreError> {
        for value in self.metadata.values() {
            validate_value(value)?;
        }

        Ok(Manifest {
            version: MANIFEST_VERSION,
            fingerprint: self.fingerprint,
            content_locator: self.content_locator,
            created_at: self.created_at,
            claimant: self.claimant,
            metadata: self.metadata,
        })
    }
}
