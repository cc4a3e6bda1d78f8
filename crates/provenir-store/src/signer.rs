//! The signer capability: wallet-style signing injected into the engine.
//!
//! Signing is interactive in the real product (a wallet prompts the user,
//! who may cancel), so it is modeled as an async capability with a
//! distinct `Declined` outcome rather than a synchronous call that can
//! only succeed or throw. The engine never sees private key material.

use async_trait::async_trait;
use thiserror::Error;

use provenir_core::{ClaimSignature, Claimant, Keypair};

/// Errors from the signer capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// The signer (user) refused or cancelled the signing request. Not a
    /// transport failure; callers branch on this.
    #[error("signing declined")]
    Declined,

    /// The signer could not be reached or failed mid-request.
    #[error("signer transport error: {0}")]
    Transport(String),
}

/// An async signing capability bound to one claimant identity.
#[async_trait]
pub trait Signer: Send + Sync {
    /// The identity this signer signs as.
    fn claimant(&self) -> Claimant;

    /// Sign the canonical bytes of a manifest.
    async fn sign(&self, canonical: &[u8]) -> Result<ClaimSignature, SignerError>;
}

/// An in-process signer holding its own keypair.
///
/// Backs tests and non-interactive embeddings; wallet integrations
/// implement [`Signer`] over their own transport.
#[derive(Clone)]
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    /// Wrap a keypair as a signer.
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        Self::new(Keypair::generate())
    }

    /// Deterministic signer from a seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::new(Keypair::from_seed(seed))
    }
}

#[async_trait]
impl Signer for KeypairSigner {
    fn claimant(&self) -> Claimant {
        self.keypair.claimant()
    }

    async fn sign(&self, canonical: &[u8]) -> Result<ClaimSignature, SignerError> {
        Ok(self.keypair.sign(canonical))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provenir_core::recover_signer;

    #[tokio::test]
    async fn test_keypair_signer_roundtrip() {
        let signer = KeypairSigner::from_seed(&[0x42; 32]);
        let message = b"canonical bytes";

        let signature = signer.sign(message).await.unwrap();
        let recovered = recover_signer(message, &signature).unwrap();
        assert_eq!(recovered, signer.claimant());
    }
}
