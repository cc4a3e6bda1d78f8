//! In-memory implementations of the collaborator traits.
//!
//! Primarily for testing and embedding. Same semantics as a real backend
//! (append-only entries, idempotent puts and bindings) with no
//! persistence. Thread-safe via RwLock.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use provenir_core::{
    Binding, BlobLocator, CanonicalLocator, Claimant, Fingerprint, Network, RegistryEntry,
};

use crate::error::Result;
use crate::traits::{AnchorReceipt, BindOutcome, BlobStore, Registry, RegistryLookup, WriteOutcome};

/// In-memory content-addressed blob store.
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<BlobLocator, Bytes>>,
}

impl MemoryBlobStore {
    /// Create a new empty blob store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of distinct blobs held.
    pub fn len(&self) -> usize {
        self.blobs.read().unwrap().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().unwrap().is_empty()
    }

    /// Overwrite the bytes behind a locator without changing the locator.
    ///
    /// A correct content-addressed store cannot do this. Test-only hook
    /// for exercising tampered-manifest detection.
    pub fn corrupt(&self, locator: &BlobLocator, bytes: impl Into<Bytes>) {
        self.blobs.write().unwrap().insert(*locator, bytes.into());
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, bytes: &[u8]) -> Result<BlobLocator> {
        let locator = BlobLocator::of(bytes);
        self.blobs
            .write()
            .unwrap()
            .entry(locator)
            .or_insert_with(|| Bytes::copy_from_slice(bytes));
        Ok(locator)
    }

    async fn get(&self, locator: &BlobLocator) -> Result<Option<Bytes>> {
        Ok(self.blobs.read().unwrap().get(locator).cloned())
    }
}

/// In-memory registry ledger.
///
/// Entries are keyed by (network, fingerprint) and are append-only.
/// By default writes confirm immediately; manual-confirmation mode leaves
/// them `Pending` until [`MemoryRegistry::confirm`] is called, which is
/// how tests exercise the `Pending` verdict.
pub struct MemoryRegistry {
    inner: RwLock<MemoryRegistryInner>,
    auto_confirm: bool,
}

struct MemoryRegistryInner {
    /// Entries indexed by (network, fingerprint).
    entries: HashMap<(Network, Fingerprint), StoredEntry>,

    /// Bindings per network, in insertion order.
    bindings: HashMap<Network, Vec<Binding>>,

    /// Extra entries injected past the append-only check (test-only, see
    /// [`MemoryRegistry::inject_divergent_entry`]).
    divergent: Vec<(Network, RegistryEntry)>,
}

struct StoredEntry {
    entry: RegistryEntry,
    confirmed: bool,
}

impl MemoryRegistry {
    /// Create a registry where writes confirm immediately.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryRegistryInner {
                entries: HashMap::new(),
                bindings: HashMap::new(),
                divergent: Vec::new(),
            }),
            auto_confirm: true,
        }
    }

    /// Create a registry where writes sit `Pending` until confirmed.
    pub fn with_manual_confirmation() -> Self {
        Self {
            auto_confirm: false,
            ..Self::new()
        }
    }

    /// Confirm a pending entry. No-op if absent or already confirmed.
    pub fn confirm(&self, fingerprint: &Fingerprint, network: &Network) {
        let mut inner = self.inner.write().unwrap();
        if let Some(stored) = inner.entries.get_mut(&(network.clone(), *fingerprint)) {
            stored.confirmed = true;
        }
    }

    /// Force a second entry for an already-registered fingerprint.
    ///
    /// Violates the registry's own append-only invariant on purpose:
    /// test-only hook for exercising the `Diverged` lookup path.
    pub fn inject_divergent_entry(&self, entry: RegistryEntry, network: &Network) {
        let mut inner = self.inner.write().unwrap();
        let key = (network.clone(), entry.fingerprint);
        if inner.entries.contains_key(&key) {
            inner.divergent.push((key.0, entry));
        } else {
            inner.entries.insert(
                key,
                StoredEntry {
                    entry,
                    confirmed: true,
                },
            );
        }
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn read(&self, fingerprint: &Fingerprint, network: &Network) -> Result<RegistryLookup> {
        let inner = self.inner.read().unwrap();

        let divergent: Vec<RegistryEntry> = inner
            .divergent
            .iter()
            .filter(|(n, e)| n == network && e.fingerprint == *fingerprint)
            .map(|(_, e)| e.clone())
            .collect();

        match inner.entries.get(&(network.clone(), *fingerprint)) {
            Some(stored) if !divergent.is_empty() => {
                let mut all = vec![stored.entry.clone()];
                all.extend(divergent);
                Ok(RegistryLookup::Diverged(all))
            }
            Some(stored) if stored.confirmed => Ok(RegistryLookup::Anchored(stored.entry.clone())),
            Some(stored) => Ok(RegistryLookup::Pending(stored.entry.clone())),
            None => Ok(RegistryLookup::Absent),
        }
    }

    async fn write(
        &self,
        fingerprint: &Fingerprint,
        manifest_locator: &BlobLocator,
        claimant: &Claimant,
        network: &Network,
    ) -> Result<WriteOutcome> {
        let mut inner = self.inner.write().unwrap();
        let key = (network.clone(), *fingerprint);

        if let Some(existing) = inner.entries.get(&key) {
            debug!(
                fingerprint = %fingerprint,
                network = %network,
                "registry write conflict"
            );
            return Ok(WriteOutcome::Conflict {
                existing: existing.entry.clone(),
            });
        }

        let anchored_at = now_millis();
        let entry = RegistryEntry {
            fingerprint: *fingerprint,
            claimant: *claimant,
            manifest_locator: *manifest_locator,
            anchored_at,
        };
        inner.entries.insert(
            key,
            StoredEntry {
                entry,
                confirmed: self.auto_confirm,
            },
        );

        debug!(fingerprint = %fingerprint, network = %network, "registry entry anchored");
        Ok(WriteOutcome::Anchored(AnchorReceipt {
            fingerprint: *fingerprint,
            network: network.clone(),
            anchored_at,
        }))
    }

    async fn read_bindings(
        &self,
        fingerprint: &Fingerprint,
        network: &Network,
    ) -> Result<Vec<Binding>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .bindings
            .get(network)
            .map(|b| {
                b.iter()
                    .filter(|binding| binding.fingerprint == *fingerprint)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_binding(
        &self,
        locator: &CanonicalLocator,
        network: &Network,
    ) -> Result<Option<Binding>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .bindings
            .get(network)
            .and_then(|b| b.iter().find(|binding| binding.locator == *locator))
            .cloned())
    }

    async fn write_binding(
        &self,
        binding: &Binding,
        claimant: &Claimant,
        network: &Network,
    ) -> Result<BindOutcome> {
        let mut inner = self.inner.write().unwrap();

        let registry_claimant = match inner
            .entries
            .get(&(network.clone(), binding.fingerprint))
        {
            Some(stored) => stored.entry.claimant,
            None => return Ok(BindOutcome::Unregistered),
        };

        if registry_claimant != *claimant {
            return Ok(BindOutcome::NotOwner { registry_claimant });
        }

        let bindings = inner.bindings.entry(network.clone()).or_default();
        if bindings.iter().any(|b| b == binding) {
            return Ok(BindOutcome::AlreadyBound);
        }

        bindings.push(binding.clone());
        debug!(
            fingerprint = %binding.fingerprint,
            locator = %binding.locator,
            network = %network,
            "binding anchored"
        );
        Ok(BindOutcome::Bound(AnchorReceipt {
            fingerprint: binding.fingerprint,
            network: network.clone(),
            anchored_at: now_millis(),
        }))
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use provenir_core::{Keypair, PlatformResolver};

    fn net() -> Network {
        Network::new("testnet")
    }

    #[tokio::test]
    async fn test_blob_store_idempotent_put() {
        let store = MemoryBlobStore::new();

        let a = store.put(b"same bytes").await.unwrap();
        let b = store.put(b"same bytes").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);

        let fetched = store.get(&a).await.unwrap().unwrap();
        assert_eq!(fetched.as_ref(), b"same bytes");
    }

    #[tokio::test]
    async fn test_blob_store_missing_is_none() {
        let store = MemoryBlobStore::new();
        let missing = BlobLocator::of(b"never stored");
        assert!(store.get(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_registry_write_then_read() {
        let registry = MemoryRegistry::new();
        let claimant = Keypair::from_seed(&[1; 32]).claimant();
        let fp = Fingerprint::of(b"content");
        let locator = BlobLocator::of(b"manifest");

        let outcome = registry.write(&fp, &locator, &claimant, &net()).await.unwrap();
        assert!(matches!(outcome, WriteOutcome::Anchored(_)));

        match registry.read(&fp, &net()).await.unwrap() {
            RegistryLookup::Anchored(entry) => {
                assert_eq!(entry.claimant, claimant);
                assert_eq!(entry.manifest_locator, locator);
            }
            other => panic!("expected anchored entry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_registry_append_only_conflict() {
        let registry = MemoryRegistry::new();
        let first = Keypair::from_seed(&[1; 32]).claimant();
        let second = Keypair::from_seed(&[2; 32]).claimant();
        let fp = Fingerprint::of(b"content");

        registry
            .write(&fp, &BlobLocator::of(b"m1"), &first, &net())
            .await
            .unwrap();

        let outcome = registry
            .write(&fp, &BlobLocator::of(b"m2"), &second, &net())
            .await
            .unwrap();
        match outcome {
            WriteOutcome::Conflict { existing } => assert_eq!(existing.claimant, first),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_registry_networks_are_isolated() {
        let registry = MemoryRegistry::new();
        let claimant = Keypair::from_seed(&[1; 32]).claimant();
        let fp = Fingerprint::of(b"content");

        registry
            .write(&fp, &BlobLocator::of(b"m"), &claimant, &Network::new("mainnet"))
            .await
            .unwrap();

        let lookup = registry.read(&fp, &Network::new("testnet")).await.unwrap();
        assert_eq!(lookup, RegistryLookup::Absent);

        // Same fingerprint on a second network is an independent
        // registration, not a conflict.
        let outcome = registry
            .write(&fp, &BlobLocator::of(b"m"), &claimant, &Network::new("testnet"))
            .await
            .unwrap();
        assert!(matches!(outcome, WriteOutcome::Anchored(_)));
    }

    #[tokio::test]
    async fn test_registry_manual_confirmation() {
        let registry = MemoryRegistry::with_manual_confirmation();
        let claimant = Keypair::from_seed(&[1; 32]).claimant();
        let fp = Fingerprint::of(b"content");

        registry
            .write(&fp, &BlobLocator::of(b"m"), &claimant, &net())
            .await
            .unwrap();
        assert!(matches!(
            registry.read(&fp, &net()).await.unwrap(),
            RegistryLookup::Pending(_)
        ));

        registry.confirm(&fp, &net());
        assert!(matches!(
            registry.read(&fp, &net()).await.unwrap(),
            RegistryLookup::Anchored(_)
        ));
    }

    #[tokio::test]
    async fn test_binding_lifecycle() {
        let registry = MemoryRegistry::new();
        let keypair = Keypair::from_seed(&[1; 32]);
        let claimant = keypair.claimant();
        let fp = Fingerprint::of(b"content");
        let resolver = PlatformResolver::new();
        let locator = resolver.normalize("youtube", "abc123xyz_Q").unwrap();
        let binding = Binding::new(fp, locator.clone());

        // Unregistered fingerprint is rejected.
        let outcome = registry.write_binding(&binding, &claimant, &net()).await.unwrap();
        assert_eq!(outcome, BindOutcome::Unregistered);

        registry
            .write(&fp, &BlobLocator::of(b"m"), &claimant, &net())
            .await
            .unwrap();

        // First write binds.
        let outcome = registry.write_binding(&binding, &claimant, &net()).await.unwrap();
        assert!(matches!(outcome, BindOutcome::Bound(_)));

        // Second write is an idempotent no-op.
        let outcome = registry.write_binding(&binding, &claimant, &net()).await.unwrap();
        assert_eq!(outcome, BindOutcome::AlreadyBound);
        assert_eq!(registry.read_bindings(&fp, &net()).await.unwrap().len(), 1);

        // Reverse lookup finds it.
        let found = registry.find_binding(&locator, &net()).await.unwrap().unwrap();
        assert_eq!(found.fingerprint, fp);
    }

    #[tokio::test]
    async fn test_binding_ownership_enforced() {
        let registry = MemoryRegistry::new();
        let owner = Keypair::from_seed(&[1; 32]).claimant();
        let other = Keypair::from_seed(&[2; 32]).claimant();
        let fp = Fingerprint::of(b"content");

        registry
            .write(&fp, &BlobLocator::of(b"m"), &owner, &net())
            .await
            .unwrap();

        let resolver = PlatformResolver::new();
        let binding = Binding::new(fp, resolver.normalize("vimeo", "123456").unwrap());

        let outcome = registry.write_binding(&binding, &other, &net()).await.unwrap();
        assert_eq!(outcome, BindOutcome::NotOwner { registry_claimant: owner });
        assert!(registry.read_bindings(&fp, &net()).await.unwrap().is_empty());
    }
}
