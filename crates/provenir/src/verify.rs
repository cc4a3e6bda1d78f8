//! Verification verdicts and reports.
//!
//! A verification run reconciles a presented artifact against registry
//! and blob-store state and produces a [`VerificationReport`]: the
//! verdict plus the evidence behind it. Reports are computed on demand
//! and never persisted.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use provenir_core::{BindingError, BlobLocator, Claimant, Fingerprint, Network};

/// The verdict states of the verification engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The presented bytes match an anchored claim and the manifest
    /// signature recovers to the registered claimant.
    Verified,

    /// A platform binding led to a fully verified claim, but the live
    /// platform bytes themselves were never compared (platforms re-encode
    /// uploads). Not a weaker statement about the original content.
    PlatformVerified,

    /// No matching claim on the queried network. Absence here is not
    /// proof of absence on other networks.
    NotVerified,

    /// A claim exists but is not yet ledger-confirmed.
    Pending,

    /// Inconsistent or tampered state: bad signature, swapped manifest,
    /// diverged registry, malformed input. A security-relevant signal,
    /// never folded into `NotVerified`.
    Invalid,
}

impl Verdict {
    /// Whether this verdict asserts a verified claim (fully or via a
    /// platform binding).
    pub fn is_verified(&self) -> bool {
        matches!(self, Verdict::Verified | Verdict::PlatformVerified)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Verified => "verified",
            Verdict::PlatformVerified => "platform-verified",
            Verdict::NotVerified => "not-verified",
            Verdict::Pending => "pending",
            Verdict::Invalid => "invalid",
        };
        write!(f, "{s}")
    }
}

/// Why a verification came back `Invalid`.
///
/// "Bad signature" and "right signature, wrong signer" are deliberately
/// separate conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    /// The manifest signature does not verify over its canonical bytes.
    /// The manifest was tampered with after signing, or the signature is
    /// forged.
    BadSignature,

    /// The signature verifies, but the recovered signer is not the
    /// expected claimant.
    ClaimantMismatch {
        recovered: Claimant,
        expected: Claimant,
    },

    /// The manifest's embedded fingerprint is not the fingerprint it was
    /// looked up under.
    FingerprintMismatch {
        manifest: Fingerprint,
        presented: Fingerprint,
    },

    /// The registry anchors a different manifest than the one presented:
    /// the manifest was swapped after anchoring.
    ManifestSwapped {
        registry_locator: BlobLocator,
        presented: BlobLocator,
    },

    /// Multiple registry entries exist for one fingerprint on one
    /// network. Every claimant is listed; the engine picks none.
    DivergedRegistry { claimants: Vec<Claimant> },

    /// The manifest document failed to parse or violates the canonical
    /// subset.
    MalformedManifest(String),

    /// An anchored entry points at a manifest the blob store cannot
    /// resolve.
    UnresolvableManifest(BlobLocator),

    /// The presented platform locator could not be normalized.
    UnrecognizedLocator(BindingError),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::BadSignature => {
                write!(f, "manifest signature does not verify")
            }
            InvalidReason::ClaimantMismatch {
                recovered,
                expected,
            } => write!(
                f,
                "signature recovers to {recovered}, expected {expected}"
            ),
            InvalidReason::FingerprintMismatch {
                manifest,
                presented,
            } => write!(
                f,
                "manifest claims fingerprint {manifest}, presented {presented}"
            ),
            InvalidReason::ManifestSwapped {
                registry_locator,
                presented,
            } => write!(
                f,
                "registry anchors manifest {registry_locator}, presented {presented}"
            ),
            InvalidReason::DivergedRegistry { claimants } => {
                write!(f, "registry diverged across {} claimants", claimants.len())
            }
            InvalidReason::MalformedManifest(msg) => write!(f, "malformed manifest: {msg}"),
            InvalidReason::UnresolvableManifest(locator) => {
                write!(f, "anchored manifest {locator} is unresolvable")
            }
            InvalidReason::UnrecognizedLocator(e) => write!(f, "{e}"),
        }
    }
}

/// Why a verification came back `NotVerified`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    /// No registry entry for the fingerprint on the queried network.
    NoEntryOnNetwork,

    /// No binding for the locator on the queried network.
    NoBindingOnNetwork,

    /// The presented manifest locator resolves to nothing.
    ManifestNotFound(BlobLocator),
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissReason::NoEntryOnNetwork => write!(
                f,
                "no registry entry on the queried network; other networks were not consulted"
            ),
            MissReason::NoBindingOnNetwork => write!(
                f,
                "no binding on the queried network; other networks were not consulted"
            ),
            MissReason::ManifestNotFound(locator) => {
                write!(f, "manifest {locator} not found in the blob store")
            }
        }
    }
}

/// The full result of one verification run: verdict plus evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// The verdict.
    pub verdict: Verdict,

    /// The network this run consulted. Verdicts never aggregate networks.
    pub network: Network,

    /// The fingerprint that was matched or computed, if any.
    pub fingerprint: Option<Fingerprint>,

    /// The claimant recovered from the manifest signature, if recovery
    /// succeeded.
    pub recovered_claimant: Option<Claimant>,

    /// The claimant the registry records, if an entry was found.
    pub registry_claimant: Option<Claimant>,

    /// The manifest's metadata, if the manifest was resolvable.
    pub metadata: Option<BTreeMap<String, Value>>,

    /// Populated when the verdict is `Invalid`.
    pub invalid: Option<InvalidReason>,

    /// Populated when the verdict is `NotVerified`.
    pub miss: Option<MissReason>,
}

impl VerificationReport {
    /// A bare report for the given verdict on a network.
    pub(crate) fn new(verdict: Verdict, network: &Network) -> Self {
        Self {
            verdict,
            network: network.clone(),
            fingerprint: None,
            recovered_claimant: None,
            registry_claimant: None,
            metadata: None,
            invalid: None,
            miss: None,
        }
    }

    pub(crate) fn not_verified(network: &Network, miss: MissReason) -> Self {
        Self {
            miss: Some(miss),
            ..Self::new(Verdict::NotVerified, network)
        }
    }

    pub(crate) fn invalid(network: &Network, reason: InvalidReason) -> Self {
        Self {
            invalid: Some(reason),
            ..Self::new(Verdict::Invalid, network)
        }
    }
}
