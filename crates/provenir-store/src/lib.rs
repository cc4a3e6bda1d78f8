//! # Provenir Store
//!
//! Collaborator contracts consumed by the provenir engine, plus in-memory
//! implementations for tests and embedding.
//!
//! The engine treats the ledger and the blob store as opaque external
//! services: [`Registry`] is an append-only ledger keyed by fingerprint,
//! [`BlobStore`] is content-addressed put/get, and [`Signer`] is the
//! wallet-style signing capability. Production backends implement these
//! traits; nothing in this workspace speaks to a real ledger.

pub mod error;
pub mod memory;
pub mod signer;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::{MemoryBlobStore, MemoryRegistry};
pub use signer::{KeypairSigner, Signer, SignerError};
pub use traits::{
    AnchorReceipt, BindOutcome, BlobStore, Registry, RegistryLookup, WriteOutcome,
};
