//! Short-lived read cache for anchored registry lookups.
//!
//! Keyed by (fingerprint, network) with an explicit TTL from
//! [`crate::EngineConfig`]. Only `Anchored` lookups are cached: `Pending`
//! and `Absent` are expected to change state and are always re-read.
//! Anchored entries are append-only on the ledger, so serving one inside
//! its TTL can never return superseded data.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use provenir_core::{Fingerprint, Network, RegistryEntry};

/// TTL cache over anchored registry entries.
pub struct ReadCache {
    ttl: Duration,
    entries: Mutex<HashMap<(Fingerprint, Network), CachedEntry>>,
}

struct CachedEntry {
    entry: RegistryEntry,
    inserted_at: Instant,
}

impl ReadCache {
    /// Create a cache with the given TTL. A zero TTL disables caching.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a cached entry if it is still inside its TTL. Stale entries
    /// are evicted on access.
    pub fn get(&self, fingerprint: &Fingerprint, network: &Network) -> Option<RegistryEntry> {
        let mut entries = self.entries.lock().unwrap();
        let key = (*fingerprint, network.clone());

        match entries.get(&key) {
            Some(cached) if cached.inserted_at.elapsed() < self.ttl => Some(cached.entry.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Cache an anchored entry.
    pub fn put(&self, network: &Network, entry: RegistryEntry) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            (entry.fingerprint, network.clone()),
            CachedEntry {
                entry,
                inserted_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provenir_core::{BlobLocator, Claimant};

    fn entry(fp: Fingerprint) -> RegistryEntry {
        RegistryEntry {
            fingerprint: fp,
            claimant: Claimant::from_bytes([1; 32]),
            manifest_locator: BlobLocator::of(b"manifest"),
            anchored_at: 1_736_870_400_000,
        }
    }

    #[test]
    fn test_cache_hit_inside_ttl() {
        let cache = ReadCache::new(Duration::from_secs(60));
        let network = Network::new("testnet");
        let fp = Fingerprint::of(b"content");

        cache.put(&network, entry(fp));
        assert_eq!(cache.get(&fp, &network), Some(entry(fp)));
    }

    #[test]
    fn test_cache_expires_at_ttl() {
        let cache = ReadCache::new(Duration::from_millis(1));
        let network = Network::new("testnet");
        let fp = Fingerprint::of(b"content");

        cache.put(&network, entry(fp));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get(&fp, &network), None);
    }

    #[test]
    fn test_zero_ttl_disables_caching() {
        let cache = ReadCache::new(Duration::ZERO);
        let network = Network::new("testnet");
        let fp = Fingerprint::of(b"content");

        cache.put(&network, entry(fp));
        assert_eq!(cache.get(&fp, &network), None);
    }

    #[test]
    fn test_cache_keys_include_network() {
        let cache = ReadCache::new(Duration::from_secs(60));
        let fp = Fingerprint::of(b"content");

        cache.put(&Network::new("mainnet"), entry(fp));
        assert_eq!(cache.get(&fp, &Network::new("testnet")), None);
    }
}
