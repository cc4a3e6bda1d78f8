//! # Provenir Core
//!
//! Pure primitives for the provenir engine: fingerprints, manifests,
//! canonical JSON, claimant signatures, and platform locator
//! normalization.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over claim data structures.
//!
//! ## Key Types
//!
//! - [`Fingerprint`] - Blake3 digest of exact content bytes
//! - [`Manifest`] / [`SignedManifest`] - The claim document and its signed form
//! - [`Claimant`] / [`ClaimSignature`] - Signing identity and recoverable signature
//! - [`BlobLocator`] - Content-addressed `b3://` locator
//! - [`CanonicalLocator`] / [`PlatformResolver`] - Normalized platform locations
//! - [`Network`] / [`RegistryEntry`] / [`Binding`] - Ledger-facing records
//!
//! ## Canonicalization
//!
//! Manifests are exchanged as canonical JSON. See [`canonical`].

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod fingerprint;
pub mod locator;
pub mod manifest;
pub mod platform;
pub mod registry;

pub use canonical::{canonical_manifest_bytes, signed_manifest_bytes};
pub use crypto::{recover_signer, ClaimSignature, Claimant, Keypair};
pub use error::{BindingError, CoreError};
pub use fingerprint::Fingerprint;
pub use locator::BlobLocator;
pub use manifest::{Manifest, ManifestBuilder, SignedManifest, MANIFEST_VERSION};
pub use platform::{CanonicalLocator, Platform, PlatformResolver};
pub use registry::{Binding, Network, RegistryEntry};
