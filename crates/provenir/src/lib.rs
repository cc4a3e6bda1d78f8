//! # Provenir
//!
//! A content provenance engine: durable, publicly-verifiable claims of
//! authorship over digital content, checkable later against a file, a
//! platform post, or a shared manifest link.
//!
//! ## Overview
//!
//! - **Fingerprint**: a Blake3 digest of exact content bytes
//! - **Manifest**: a signed claim document binding a fingerprint to a
//!   claimant and metadata, exchanged as canonical JSON
//! - **Registry entry**: an append-only ledger record anchoring a
//!   fingerprint to a claimant and manifest locator on one network
//! - **Binding**: a secondary association of a fingerprint to a platform
//!   location (a YouTube video, a tweet, ...)
//! - **Verification**: reconciling a presented artifact against anchored
//!   state, yielding `Verified`, `PlatformVerified`, `NotVerified`,
//!   `Pending`, or `Invalid` with evidence
//!
//! The ledger and blob store are external collaborators behind the
//! [`store`] traits; signing is an injected async capability so wallets
//! can prompt (and users can decline).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use provenir::{ContentVisibility, Engine, EngineConfig};
//! use provenir::core::Network;
//! use provenir::store::{KeypairSigner, MemoryBlobStore, MemoryRegistry};
//!
//! async fn example() {
//!     let engine = Engine::new(
//!         MemoryBlobStore::new(),
//!         MemoryRegistry::new(),
//!         EngineConfig::default(),
//!     );
//!     let signer = KeypairSigner::generate();
//!     let network = Network::new("mainnet");
//!
//!     let registration = engine
//!         .register(
//!             b"my work",
//!             BTreeMap::new(),
//!             ContentVisibility::Public,
//!             &signer,
//!             &network,
//!         )
//!         .await
//!         .unwrap();
//!
//!     let report = engine.verify_bytes(b"my work", &network).await.unwrap();
//!     assert!(report.verdict.is_verified());
//!     let _ = registration;
//! }
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod verify;

// Re-export component crates
pub use provenir_core as core;
pub use provenir_store as store;

// Re-export main types for convenience
pub use engine::{
    BindItemOutcome, BindRequest, BindResult, ContentVisibility, Engine, EngineConfig,
    Registration,
};
pub use error::{EngineError, Result};
pub use verify::{InvalidReason, MissReason, Verdict, VerificationReport};

// Re-export commonly used core types
pub use provenir_core::{
    Binding, BlobLocator, CanonicalLocator, ClaimSignature, Claimant, Fingerprint, Keypair,
    Manifest, ManifestBuilder, Network, Platform, PlatformResolver, RegistryEntry, SignedManifest,
};
