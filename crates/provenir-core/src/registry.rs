//! Registry-facing data types: networks, anchored entries, and bindings.
//!
//! The registry itself is an external collaborator (see provenir-store for
//! the trait). These are the records it deals in.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::Claimant;
use crate::fingerprint::Fingerprint;
use crate::locator::BlobLocator;
use crate::platform::CanonicalLocator;

/// A ledger network, chosen explicitly by the caller for every operation.
///
/// An entry anchored on one network says nothing about any other. The
/// engine never aggregates across networks.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Network(String);

impl Network {
    /// Create a network handle from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The network name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Network({})", self.0)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Network {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A registry entry anchoring a fingerprint to a claimant and manifest.
///
/// Append-only once present: the engine never updates or deletes an entry.
/// Metadata changes are new manifests; location changes are bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// The anchored content fingerprint.
    pub fingerprint: Fingerprint,

    /// The identity recorded as owner of the claim.
    pub claimant: Claimant,

    /// Where the signed manifest lives in the blob store.
    pub manifest_locator: BlobLocator,

    /// Ledger-assigned anchor time (Unix ms). Authoritative for ordering
    /// claims, unlike the manifest's self-reported `created_at`.
    pub anchored_at: i64,
}

/// A secondary association of a fingerprint to a third-party platform
/// location. Never mutated; a changed locator is a remove plus an add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// The fingerprint this binding attaches to.
    pub fingerprint: Fingerprint,

    /// The normalized platform locator.
    pub locator: CanonicalLocator,
}

impl Binding {
    /// Create a binding from a fingerprint and a normalized locator.
    pub fn new(fingerprint: Fingerprint, locator: CanonicalLocator) -> Self {
        Self {
            fingerprint,
            locator,
        }
    }
}
