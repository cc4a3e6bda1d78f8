//! Collaborator traits: the abstract interfaces for blob storage and the
//! registry ledger.
//!
//! The engine is storage-agnostic. Production deployments back these with
//! a real content-addressed store and ledger; the in-memory
//! implementations exist for tests and embedding.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use provenir_core::{
    Binding, BlobLocator, CanonicalLocator, Claimant, Fingerprint, Network, RegistryEntry,
};

use crate::error::Result;

/// Result of reading a fingerprint's registry state on one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryLookup {
    /// No entry on the queried network. Says nothing about other networks.
    Absent,
    /// An entry was submitted but is not yet ledger-confirmed. Expected to
    /// change state.
    Pending(RegistryEntry),
    /// A confirmed, anchored entry.
    Anchored(RegistryEntry),
    /// Multiple entries for one fingerprint on one network. Must not occur
    /// under correct registry semantics; surfaced so the caller can show
    /// every claimant instead of picking one.
    Diverged(Vec<RegistryEntry>),
}

impl RegistryLookup {
    /// The single entry, if this lookup holds exactly one.
    pub fn entry(&self) -> Option<&RegistryEntry> {
        match self {
            RegistryLookup::Pending(e) | RegistryLookup::Anchored(e) => Some(e),
            RegistryLookup::Absent | RegistryLookup::Diverged(_) => None,
        }
    }
}

/// Ledger acknowledgement of an accepted write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorReceipt {
    /// The fingerprint the write was keyed by.
    pub fingerprint: Fingerprint,
    /// The network that accepted the write.
    pub network: Network,
    /// Ledger-assigned anchor time (Unix ms).
    pub anchored_at: i64,
}

/// Result of writing a registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The entry was accepted and anchored.
    Anchored(AnchorReceipt),
    /// An entry already exists for this fingerprint on this network.
    /// Entries are append-only; the existing record is returned as
    /// evidence, never overwritten.
    Conflict {
        /// The pre-existing entry.
        existing: RegistryEntry,
    },
}

/// Result of writing a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    /// The binding was recorded.
    Bound(AnchorReceipt),
    /// The identical (fingerprint, platform, locator) binding already
    /// exists. Idempotent, not an error.
    AlreadyBound,
    /// The writer is not the registry entry's claimant.
    NotOwner {
        /// The claimant the registry actually records.
        registry_claimant: Claimant,
    },
    /// No registry entry exists for the fingerprint on this network.
    Unregistered,
}

/// Content-addressed blob storage.
///
/// # Design Notes
///
/// - **Idempotent puts**: putting identical bytes twice returns the same
///   locator.
/// - **Missing blobs are values**: `get` returns `None` rather than an
///   error so transport failures stay distinguishable from absence.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes, returning their content-addressed locator.
    async fn put(&self, bytes: &[u8]) -> Result<BlobLocator>;

    /// Fetch bytes by locator.
    async fn get(&self, locator: &BlobLocator) -> Result<Option<Bytes>>;
}

/// The append-only registry ledger, keyed by fingerprint.
///
/// Every operation takes an explicit [`Network`]; nothing here aggregates
/// across networks.
///
/// # Design Notes
///
/// - **Append-only entries**: a write for an already-present fingerprint
///   returns `Conflict` with the existing record. No updates, no deletes.
/// - **Idempotent bindings**: writing an existing (fingerprint, platform,
///   locator) triple returns `AlreadyBound`.
/// - **Ownership enforced at the ledger too**: `write_binding` re-checks
///   the claimant even when the engine already did, so a racing caller
///   cannot slip a binding past the check.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Read the registry state for a fingerprint on a network.
    async fn read(&self, fingerprint: &Fingerprint, network: &Network) -> Result<RegistryLookup>;

    /// Anchor a new entry for a fingerprint on a network.
    async fn write(
        &self,
        fingerprint: &Fingerprint,
        manifest_locator: &BlobLocator,
        claimant: &Claimant,
        network: &Network,
    ) -> Result<WriteOutcome>;

    /// All bindings attached to a fingerprint on a network.
    async fn read_bindings(
        &self,
        fingerprint: &Fingerprint,
        network: &Network,
    ) -> Result<Vec<Binding>>;

    /// Reverse lookup: the binding for a canonical locator, if any.
    async fn find_binding(
        &self,
        locator: &CanonicalLocator,
        network: &Network,
    ) -> Result<Option<Binding>>;

    /// Attach a binding to a registered fingerprint.
    async fn write_binding(
        &self,
        binding: &Binding,
        claimant: &Claimant,
        network: &Network,
    ) -> Result<BindOutcome>;
}
