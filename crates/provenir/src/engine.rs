//! The Engine: unified API for content provenance.
//!
//! Brings the fingerprint function, manifest builder, blob store,
//! registry, and binding resolver together into registration, binding,
//! and verification flows. The engine holds no long-lived mutable state
//! beyond a TTL read cache and is safe to share across tasks.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use provenir_core::{
    recover_signer, Binding, BlobLocator, Claimant, Fingerprint, ManifestBuilder, Network,
    PlatformResolver, RegistryEntry, SignedManifest,
};
use provenir_store::{
    AnchorReceipt, BindOutcome, BlobStore, Registry, RegistryLookup, Signer, WriteOutcome,
};

use crate::cache::ReadCache;
use crate::error::{EngineError, Result};
use crate::verify::{InvalidReason, MissReason, Verdict, VerificationReport};

/// Configuration for the Engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// TTL for the registry read cache. Zero disables caching. The cache
    /// only ever holds anchored entries; `Pending` and `Absent` lookups
    /// always go to the registry.
    pub cache_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30),
        }
    }
}

/// Whether registration publishes the raw content alongside the claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentVisibility {
    /// Put the content into the blob store and embed its locator in the
    /// manifest.
    Public,
    /// Privacy mode: only the fingerprint is disclosed.
    Private,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    /// The anchored content fingerprint.
    pub fingerprint: Fingerprint,
    /// Where the signed manifest was persisted.
    pub manifest_locator: BlobLocator,
    /// Where the raw content was persisted (public visibility only).
    pub content_locator: Option<BlobLocator>,
    /// The signed manifest itself.
    pub manifest: SignedManifest,
    /// The ledger's acknowledgement.
    pub receipt: AnchorReceipt,
}

/// Result of a successful bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindResult {
    /// A new binding was anchored.
    Bound {
        binding: Binding,
        receipt: AnchorReceipt,
    },
    /// The identical binding already existed; nothing was written.
    AlreadyBound { binding: Binding },
}

impl BindResult {
    /// The binding this result refers to.
    pub fn binding(&self) -> &Binding {
        match self {
            BindResult::Bound { binding, .. } | BindResult::AlreadyBound { binding } => binding,
        }
    }
}

/// One (platform, raw locator) pair for a batch bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    pub platform: String,
    pub locator: String,
}

impl BindRequest {
    pub fn new(platform: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            locator: locator.into(),
        }
    }
}

/// Per-item outcome of a batch bind. One item failing to normalize never
/// blocks the others.
#[derive(Debug)]
pub struct BindItemOutcome {
    /// The request as submitted.
    pub request: BindRequest,
    /// What happened to it.
    pub outcome: Result<BindResult>,
}

/// The main Engine struct.
///
/// Provides a unified API for:
/// - Registering content claims (fingerprint + signed manifest + anchor)
/// - Attaching platform bindings to anchored claims
/// - Verifying presented artifacts against anchored state
pub struct Engine<B: BlobStore, R: Registry> {
    /// The blob store backend.
    blobs: Arc<B>,
    /// The registry ledger backend.
    registry: Arc<R>,
    /// Platform locator normalization table.
    resolver: PlatformResolver,
    /// Read cache for anchored lookups.
    cache: ReadCache,
    /// Configuration.
    config: EngineConfig,
}

impl<B: BlobStore, R: Registry> Engine<B, R> {
    /// Create a new engine instance with the built-in platform table.
    pub fn new(blobs: B, registry: R, config: EngineConfig) -> Self {
        let cache = ReadCache::new(config.cache_ttl);
        Self {
            blobs: Arc::new(blobs),
            registry: Arc::new(registry),
            resolver: PlatformResolver::new(),
            cache,
            config,
        }
    }

    /// Get the blob store reference.
    pub fn blob_store(&self) -> &B {
        &self.blobs
    }

    /// Get the registry reference.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// The platform resolver.
    pub fn resolver(&self) -> &PlatformResolver {
        &self.resolver
    }

    /// Mutable access to the platform resolver, for registering
    /// additional platforms.
    pub fn resolver_mut(&mut self) -> &mut PlatformResolver {
        &mut self.resolver
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────

    /// Register a claim over content bytes on a network.
    ///
    /// Two-phase, in order: the signed manifest (and, for public
    /// visibility, the content) is persisted to the blob store and
    /// confirmed durable *before* the registry write is submitted, so
    /// every anchored entry points at a resolvable manifest.
    ///
    /// A lost race or pre-existing entry surfaces as
    /// [`EngineError::Conflict`] (different claimant) or
    /// [`EngineError::AlreadyRegistered`] (same claimant), never as a
    /// silent success. Signer refusal surfaces as
    /// [`EngineError::Declined`].
    pub async fn register<S: Signer + ?Sized>(
        &self,
        content: &[u8],
        metadata: BTreeMap<String, Value>,
        visibility: ContentVisibility,
        signer: &S,
        network: &Network,
    ) -> Result<Registration> {
        let fingerprint = Fingerprint::of(content);
        let claimant = signer.claimant();

        let content_locator = match visibility {
            ContentVisibility::Public => Some(self.blobs.put(content).await?),
            ContentVisibility::Private => None,
        };

        let mut builder = ManifestBuilder::new(fingerprint, claimant)
            .created_at(now_millis())
            .metadata(metadata);
        if let Some(locator) = content_locator {
            builder = builder.content_locator(locator);
        }
        let manifest = builder.build()?;

        let canonical = manifest.canonical_bytes()?;
        let signature = signer.sign(&canonical).await?;
        let signed = manifest.into_signed(signature);

        // Phase a: manifest durable in the blob store.
        let manifest_locator = self.blobs.put(&signed.to_json()?).await?;

        // Phase b: anchor the entry. A concurrent writer loses here and
        // gets the existing record as evidence.
        let receipt = match self
            .registry
            .write(&fingerprint, &manifest_locator, &claimant, network)
            .await?
        {
            WriteOutcome::Anchored(receipt) => receipt,
            WriteOutcome::Conflict { existing } => {
                return Err(if existing.claimant == claimant {
                    EngineError::AlreadyRegistered { existing }
                } else {
                    EngineError::Conflict { existing }
                });
            }
        };

        info!(
            fingerprint = %fingerprint,
            network = %network,
            claimant = %claimant,
            "claim registered"
        );

        Ok(Registration {
            fingerprint,
            manifest_locator,
            content_locator,
            manifest: signed,
            receipt,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Binding
    // ─────────────────────────────────────────────────────────────────────

    /// Attach a platform binding to an anchored fingerprint.
    ///
    /// Preconditions: the fingerprint must be anchored on `network` and
    /// `claimant` must be the registry's recorded owner. Binding an
    /// already-bound (platform, locator) pair is an idempotent no-op.
    pub async fn bind(
        &self,
        fingerprint: Fingerprint,
        platform: &str,
        raw_locator: &str,
        claimant: &Claimant,
        network: &Network,
    ) -> Result<BindResult> {
        let locator = self.resolver.normalize(platform, raw_locator)?;

        match self.lookup_cached(&fingerprint, network).await? {
            RegistryLookup::Absent => {
                return Err(EngineError::Unregistered {
                    fingerprint,
                    network: network.clone(),
                })
            }
            RegistryLookup::Pending(_) => {
                return Err(EngineError::RegistrationPending {
                    fingerprint,
                    network: network.clone(),
                })
            }
            RegistryLookup::Diverged(entries) => {
                return Err(EngineError::Diverged { entries })
            }
            RegistryLookup::Anchored(entry) => {
                if entry.claimant != *claimant {
                    return Err(EngineError::NotOwner {
                        claimant: *claimant,
                        registry_claimant: entry.claimant,
                    });
                }
            }
        }

        let binding = Binding::new(fingerprint, locator);
        match self
            .registry
            .write_binding(&binding, claimant, network)
            .await?
        {
            BindOutcome::Bound(receipt) => {
                info!(
                    fingerprint = %fingerprint,
                    locator = %binding.locator,
                    network = %network,
                    "binding anchored"
                );
                Ok(BindResult::Bound { binding, receipt })
            }
            BindOutcome::AlreadyBound => Ok(BindResult::AlreadyBound { binding }),
            // The ledger re-checks; these only fire on a race against an
            // ownership transfer or entry loss we did not observe.
            BindOutcome::NotOwner { registry_claimant } => Err(EngineError::NotOwner {
                claimant: *claimant,
                registry_claimant,
            }),
            BindOutcome::Unregistered => Err(EngineError::Unregistered {
                fingerprint,
                network: network.clone(),
            }),
        }
    }

    /// Bind several platform locators, reporting per-item outcomes.
    ///
    /// One locator failing to normalize (or bind) never blocks the rest.
    pub async fn bind_all(
        &self,
        fingerprint: Fingerprint,
        requests: Vec<BindRequest>,
        claimant: &Claimant,
        network: &Network,
    ) -> Vec<BindItemOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            let outcome = self
                .bind(
                    fingerprint,
                    &request.platform,
                    &request.locator,
                    claimant,
                    network,
                )
                .await;
            outcomes.push(BindItemOutcome { request, outcome });
        }
        outcomes
    }

    /// All bindings attached to a fingerprint on a network.
    pub async fn bindings(
        &self,
        fingerprint: &Fingerprint,
        network: &Network,
    ) -> Result<Vec<Binding>> {
        Ok(self.registry.read_bindings(fingerprint, network).await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────

    /// Verify presented file bytes against the registry on one network.
    pub async fn verify_bytes(
        &self,
        content: &[u8],
        network: &Network,
    ) -> Result<VerificationReport> {
        let fingerprint = Fingerprint::of(content);
        debug!(fingerprint = %fingerprint, network = %network, "verifying by bytes");
        self.verify_fingerprint(fingerprint, network).await
    }

    /// Verify a fingerprint against the registry on one network.
    pub async fn verify_fingerprint(
        &self,
        fingerprint: Fingerprint,
        network: &Network,
    ) -> Result<VerificationReport> {
        match self.lookup_cached(&fingerprint, network).await? {
            RegistryLookup::Absent => {
                let mut report =
                    VerificationReport::not_verified(network, MissReason::NoEntryOnNetwork);
                report.fingerprint = Some(fingerprint);
                Ok(report)
            }
            RegistryLookup::Pending(entry) => {
                let mut report = VerificationReport::new(Verdict::Pending, network);
                report.fingerprint = Some(fingerprint);
                report.registry_claimant = Some(entry.claimant);
                Ok(report)
            }
            RegistryLookup::Diverged(entries) => {
                let mut report = VerificationReport::invalid(
                    network,
                    InvalidReason::DivergedRegistry {
                        claimants: entries.iter().map(|e| e.claimant).collect(),
                    },
                );
                report.fingerprint = Some(fingerprint);
                Ok(report)
            }
            RegistryLookup::Anchored(entry) => {
                self.check_anchored(&entry, fingerprint, network).await
            }
        }
    }

    /// Verify a platform locator: resolve its binding, then verify the
    /// bound claim.
    ///
    /// Full success reports [`Verdict::PlatformVerified`], never
    /// [`Verdict::Verified`]: the live platform bytes were not compared.
    pub async fn verify_platform(
        &self,
        platform: &str,
        raw_locator: &str,
        network: &Network,
    ) -> Result<VerificationReport> {
        let locator = match self.resolver.normalize(platform, raw_locator) {
            Ok(locator) => locator,
            Err(e) => {
                return Ok(VerificationReport::invalid(
                    network,
                    InvalidReason::UnrecognizedLocator(e),
                ))
            }
        };

        debug!(locator = %locator, network = %network, "verifying by platform locator");

        let binding = match self.registry.find_binding(&locator, network).await? {
            Some(binding) => binding,
            None => {
                return Ok(VerificationReport::not_verified(
                    network,
                    MissReason::NoBindingOnNetwork,
                ))
            }
        };

        let mut report = self.verify_fingerprint(binding.fingerprint, network).await?;
        if report.verdict == Verdict::Verified {
            report.verdict = Verdict::PlatformVerified;
        }
        Ok(report)
    }

    /// Verify a manifest reference directly (proof regeneration).
    ///
    /// Skips the fingerprint lookup: fetches the manifest, verifies its
    /// signature, then cross-checks against the registry entry to ensure
    /// the manifest was not swapped after anchoring.
    pub async fn verify_manifest(
        &self,
        locator: &BlobLocator,
        network: &Network,
    ) -> Result<VerificationReport> {
        let doc = match self.blobs.get(locator).await? {
            Some(doc) => doc,
            None => {
                return Ok(VerificationReport::not_verified(
                    network,
                    MissReason::ManifestNotFound(*locator),
                ))
            }
        };

        let signed = match SignedManifest::from_json(&doc) {
            Ok(signed) => signed,
            Err(e) => {
                return Ok(VerificationReport::invalid(
                    network,
                    InvalidReason::MalformedManifest(e.to_string()),
                ))
            }
        };

        let fingerprint = signed.manifest.fingerprint;
        let mut report = VerificationReport::new(Verdict::Verified, network);
        report.fingerprint = Some(fingerprint);
        report.metadata = Some(signed.manifest.metadata.clone());

        let canonical = match signed.manifest.canonical_bytes() {
            Ok(canonical) => canonical,
            Err(e) => {
                report.verdict = Verdict::Invalid;
                report.invalid = Some(InvalidReason::MalformedManifest(e.to_string()));
                return Ok(report);
            }
        };
        let recovered = match recover_signer(&canonical, &signed.signature) {
            Ok(recovered) => recovered,
            Err(_) => {
                report.verdict = Verdict::Invalid;
                report.invalid = Some(InvalidReason::BadSignature);
                return Ok(report);
            }
        };
        report.recovered_claimant = Some(recovered);

        if recovered != signed.manifest.claimant {
            report.verdict = Verdict::Invalid;
            report.invalid = Some(InvalidReason::ClaimantMismatch {
                recovered,
                expected: signed.manifest.claimant,
            });
            return Ok(report);
        }

        match self.lookup_cached(&fingerprint, network).await? {
            RegistryLookup::Absent => {
                report.verdict = Verdict::NotVerified;
                report.miss = Some(MissReason::NoEntryOnNetwork);
            }
            RegistryLookup::Pending(entry) => {
                report.registry_claimant = Some(entry.claimant);
                report.verdict = Verdict::Pending;
            }
            RegistryLookup::Diverged(entries) => {
                report.verdict = Verdict::Invalid;
                report.invalid = Some(InvalidReason::DivergedRegistry {
                    claimants: entries.iter().map(|e| e.claimant).collect(),
                });
            }
            RegistryLookup::Anchored(entry) => {
                report.registry_claimant = Some(entry.claimant);
                if entry.manifest_locator != *locator {
                    report.verdict = Verdict::Invalid;
                    report.invalid = Some(InvalidReason::ManifestSwapped {
                        registry_locator: entry.manifest_locator,
                        presented: *locator,
                    });
                } else if entry.claimant != recovered {
                    report.verdict = Verdict::Invalid;
                    report.invalid = Some(InvalidReason::ClaimantMismatch {
                        recovered,
                        expected: entry.claimant,
                    });
                }
            }
        }

        Ok(report)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    /// Registry read through the TTL cache. Only anchored lookups are
    /// cached; `Pending` and `Absent` always hit the registry.
    async fn lookup_cached(
        &self,
        fingerprint: &Fingerprint,
        network: &Network,
    ) -> Result<RegistryLookup> {
        if let Some(entry) = self.cache.get(fingerprint, network) {
            return Ok(RegistryLookup::Anchored(entry));
        }

        let lookup = self.registry.read(fingerprint, network).await?;
        if let RegistryLookup::Anchored(entry) = &lookup {
            self.cache.put(network, entry.clone());
        }
        Ok(lookup)
    }

    /// Reconcile an anchored entry against its manifest.
    async fn check_anchored(
        &self,
        entry: &RegistryEntry,
        presented: Fingerprint,
        network: &Network,
    ) -> Result<VerificationReport> {
        let mut report = VerificationReport::new(Verdict::Verified, network);
        report.fingerprint = Some(presented);
        report.registry_claimant = Some(entry.claimant);

        // An anchored entry must resolve; registration only anchors after
        // the manifest put is durable. A hole here is tampering or data
        // loss, not a routine miss.
        let doc = match self.blobs.get(&entry.manifest_locator).await? {
            Some(doc) => doc,
            None => {
                report.verdict = Verdict::Invalid;
                report.invalid = Some(InvalidReason::UnresolvableManifest(entry.manifest_locator));
                return Ok(report);
            }
        };

        let signed = match SignedManifest::from_json(&doc) {
            Ok(signed) => signed,
            Err(e) => {
                report.verdict = Verdict::Invalid;
                report.invalid = Some(InvalidReason::MalformedManifest(e.to_string()));
                return Ok(report);
            }
        };

        let canonical = match signed.manifest.canonical_bytes() {
            Ok(canonical) => canonical,
            Err(e) => {
                report.verdict = Verdict::Invalid;
                report.invalid = Some(InvalidReason::MalformedManifest(e.to_string()));
                return Ok(report);
            }
        };

        let recovered = match recover_signer(&canonical, &signed.signature) {
            Ok(recovered) => recovered,
            Err(_) => {
                report.verdict = Verdict::Invalid;
                report.invalid = Some(InvalidReason::BadSignature);
                return Ok(report);
            }
        };
        report.recovered_claimant = Some(recovered);

        if recovered != signed.manifest.claimant {
            report.verdict = Verdict::Invalid;
            report.invalid = Some(InvalidReason::ClaimantMismatch {
                recovered,
                expected: signed.manifest.claimant,
            });
            return Ok(report);
        }

        if signed.manifest.fingerprint != presented {
            report.verdict = Verdict::Invalid;
            report.invalid = Some(InvalidReason::FingerprintMismatch {
                manifest: signed.manifest.fingerprint,
                presented,
            });
            return Ok(report);
        }

        if recovered != entry.claimant {
            report.verdict = Verdict::Invalid;
            report.invalid = Some(InvalidReason::ClaimantMismatch {
                recovered,
                expected: entry.claimant,
            });
            return Ok(report);
        }

        report.metadata = Some(signed.manifest.metadata);
        Ok(report)
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
