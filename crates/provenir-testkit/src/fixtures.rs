//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::collections::BTreeMap;

use async_trait::async_trait;

use provenir::{ContentVisibility, Engine, EngineConfig, Registration};
use provenir_core::{ClaimSignature, Claimant, Keypair, Network};
use provenir_store::{
    KeypairSigner, MemoryBlobStore, MemoryRegistry, Signer, SignerError,
};

/// A test fixture with a signer and an engine over in-memory backends.
pub struct TestFixture {
    pub signer: KeypairSigner,
    pub engine: Engine<MemoryBlobStore, MemoryRegistry>,
}

impl TestFixture {
    /// Create a new fixture with a random signer identity.
    pub fn new() -> Self {
        Self {
            signer: KeypairSigner::generate(),
            engine: Engine::new(
                MemoryBlobStore::new(),
                MemoryRegistry::new(),
                EngineConfig::default(),
            ),
        }
    }

    /// Create with a deterministic signer from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            signer: KeypairSigner::from_seed(&seed),
            engine: Engine::new(
                MemoryBlobStore::new(),
                MemoryRegistry::new(),
                EngineConfig::default(),
            ),
        }
    }

    /// Create a fixture whose registry keeps entries pending until
    /// explicitly confirmed.
    pub fn pending() -> Self {
        Self {
            signer: KeypairSigner::generate(),
            engine: Engine::new(
                MemoryBlobStore::new(),
                MemoryRegistry::with_manual_confirmation(),
                EngineConfig::default(),
            ),
        }
    }

    /// The fixture signer's claimant identity.
    pub fn claimant(&self) -> Claimant {
        self.signer.claimant()
    }

    /// Register content publicly with empty metadata.
    pub async fn register(
        &self,
        content: &[u8],
        network: &Network,
    ) -> provenir::Result<Registration> {
        self.engine
            .register(
                content,
                BTreeMap::new(),
                ContentVisibility::Public,
                &self.signer,
                network,
            )
            .await
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple fixtures sharing nothing, for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// A default network for tests.
pub fn test_network() -> Network {
    Network::new("testnet")
}

/// A signer that always declines, for exercising wallet-refusal paths.
pub struct DecliningSigner {
    claimant: Claimant,
}

impl DecliningSigner {
    /// A declining signer with a random identity.
    pub fn new() -> Self {
        Self {
            claimant: Keypair::generate().claimant(),
        }
    }
}

impl Default for DecliningSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Signer for DecliningSigner {
    fn claimant(&self) -> Claimant {
        self.claimant
    }

    async fn sign(&self, _canonical: &[u8]) -> Result<ClaimSignature, SignerError> {
        Err(SignerError::Declined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provenir::Verdict;

    #[tokio::test]
    async fn test_fixture_register_verify() {
        let fixture = TestFixture::new();
        let network = test_network();

        fixture.register(b"fixture content", &network).await.unwrap();
        let report = fixture
            .engine
            .verify_bytes(b"fixture content", &network)
            .await
            .unwrap();
        assert_eq!(report.verdict, Verdict::Verified);
    }

    #[tokio::test]
    async fn test_multi_party_unique_identities() {
        let parties = multi_party_fixtures(3);
        let claimants: Vec<_> = parties.iter().map(|p| p.claimant()).collect();

        assert_ne!(claimants[0], claimants[1]);
        assert_ne!(claimants[1], claimants[2]);
        assert_ne!(claimants[0], claimants[2]);
    }

    #[tokio::test]
    async fn test_declining_signer_declines() {
        let signer = DecliningSigner::new();
        let result = signer.sign(b"anything").await;
        assert!(matches!(result, Err(SignerError::Declined)));
    }
}
