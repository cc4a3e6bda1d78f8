//! Error types for the engine.

use provenir_core::{BindingError, Claimant, CoreError, Fingerprint, Network, RegistryEntry};
use provenir_store::{SignerError, StoreError};
use thiserror::Error;

/// Errors that can occur during engine operations.
///
/// `Conflict` and `Diverged` carry the full conflicting records; the
/// engine never resolves these silently.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The signer refused or cancelled the signing request.
    #[error("signing declined")]
    Declined,

    /// The signer failed for a non-refusal reason.
    #[error("signer error: {0}")]
    Signer(SignerError),

    /// Binding or verification referenced a fingerprint with no registry
    /// entry on the queried network.
    #[error("fingerprint {fingerprint} is not registered on network {network}")]
    Unregistered {
        fingerprint: Fingerprint,
        network: Network,
    },

    /// The fingerprint's registration has not been ledger-confirmed yet.
    #[error("registration of {fingerprint} on network {network} is still pending")]
    RegistrationPending {
        fingerprint: Fingerprint,
        network: Network,
    },

    /// The caller is not the claimant the registry records as owner.
    #[error("claimant {claimant} is not the owner (registry records {registry_claimant})")]
    NotOwner {
        claimant: Claimant,
        registry_claimant: Claimant,
    },

    /// This claimant already holds an entry for the fingerprint on this
    /// network. Registering the same content on a *different* network is
    /// not this condition.
    #[error("fingerprint {} already registered on this network by this claimant", .existing.fingerprint)]
    AlreadyRegistered { existing: RegistryEntry },

    /// A different claimant already holds an entry for the fingerprint on
    /// this network.
    #[error("fingerprint {} already claimed by {}", .existing.fingerprint, .existing.claimant)]
    Conflict { existing: RegistryEntry },

    /// The registry returned multiple entries for one fingerprint on one
    /// network. All records are surfaced.
    #[error("registry returned {} entries for one fingerprint", .entries.len())]
    Diverged { entries: Vec<RegistryEntry> },

    /// Locator normalization failure.
    #[error("binding error: {0}")]
    Binding(#[from] BindingError),

    /// Manifest or signature error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Blob store or registry transport failure. Retryable by the caller;
    /// the engine itself never retries.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<SignerError> for EngineError {
    fn from(e: SignerError) -> Self {
        match e {
            SignerError::Declined => EngineError::Declined,
            other => EngineError::Signer(other),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
