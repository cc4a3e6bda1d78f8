//! End-to-end scenarios for the provenance engine: register, bind,
//! verify, and the failure modes between them.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::json;

use provenir::core::{
    canonical_manifest_bytes, ClaimSignature, Claimant, Fingerprint, Keypair, ManifestBuilder,
    Network,
};
use provenir::store::{
    BlobStore, KeypairSigner, MemoryBlobStore, MemoryRegistry, Registry, RegistryLookup, Signer,
    SignerError,
};
use provenir::{
    BindRequest, BindResult, ContentVisibility, Engine, EngineConfig, EngineError, InvalidReason,
    MissReason, Verdict,
};

fn engine() -> Engine<MemoryBlobStore, MemoryRegistry> {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .try_init();
    Engine::new(
        MemoryBlobStore::new(),
        MemoryRegistry::new(),
        EngineConfig::default(),
    )
}

fn pending_engine() -> Engine<MemoryBlobStore, MemoryRegistry> {
    Engine::new(
        MemoryBlobStore::new(),
        MemoryRegistry::with_manual_confirmation(),
        EngineConfig::default(),
    )
}

fn network() -> Network {
    Network::new("mainnet")
}

fn metadata() -> BTreeMap<String, serde_json::Value> {
    let mut m = BTreeMap::new();
    m.insert("title".to_string(), json!("Sunrise Timelapse"));
    m.insert("license".to_string(), json!("CC-BY-4.0"));
    m
}

/// A signer that always refuses, as a wallet user hitting "cancel" does.
struct DecliningSigner {
    claimant: Claimant,
}

impl DecliningSigner {
    fn new() -> Self {
        Self {
            claimant: Keypair::generate().claimant(),
        }
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

// ─────────────────────────────────────────────────────────────────────────
// Registration + byte verification
// ─────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_then_verify_bytes() {
    let engine = engine();
    let signer = KeypairSigner::from_seed(&[0x01; 32]);
    let content = b"a creative work, byte for byte";

    let registration = engine
        .register(
            content,
            metadata(),
            ContentVisibility::Public,
            &signer,
            &network(),
        )
        .await
        .unwrap();

    assert_eq!(registration.fingerprint, Fingerprint::of(content));
    assert!(registration.content_locator.is_some());

    let report = engine.verify_bytes(content, &network()).await.unwrap();
    assert_eq!(report.verdict, Verdict::Verified);
    assert_eq!(report.fingerprint, Some(registration.fingerprint));
    assert_eq!(report.recovered_claimant, Some(signer.claimant()));
    assert_eq!(report.registry_claimant, Some(signer.claimant()));
    assert_eq!(
        report.metadata.unwrap().get("title"),
        Some(&json!("Sunrise Timelapse"))
    );
}

#[tokio::test]
async fn verify_unregistered_bytes_is_not_verified() {
    let engine = engine();

    let report = engine
        .verify_bytes(b"never registered", &network())
        .await
        .unwrap();

    assert_eq!(report.verdict, Verdict::NotVerified);
    assert_eq!(report.miss, Some(MissReason::NoEntryOnNetwork));
    // Absence is network-scoped; the report says which network it speaks for.
    assert_eq!(report.network, network());
}

#[tokio::test]
async fn changed_bytes_do_not_verify() {
    let engine = engine();
    let signer = KeypairSigner::from_seed(&[0x01; 32]);

    engine
        .register(
            b"original bytes",
            BTreeMap::new(),
            ContentVisibility::Public,
            &signer,
            &network(),
        )
        .await
        .unwrap();

    let report = engine
        .verify_bytes(b"original bytes!", &network())
        .await
        .unwrap();
    assert_eq!(report.verdict, Verdict::NotVerified);
}

#[tokio::test]
async fn privacy_mode_registers_without_content() {
    let engine = engine();
    let signer = KeypairSigner::from_seed(&[0x02; 32]);
    let content = b"unpublished draft";

    let registration = engine
        .register(
            content,
            BTreeMap::new(),
            ContentVisibility::Private,
            &signer,
            &network(),
        )
        .await
        .unwrap();

    assert!(registration.content_locator.is_none());
    assert!(registration.manifest.manifest.content_locator.is_none());
    // Only the manifest was persisted, not the content.
    assert_eq!(engine.blob_store().len(), 1);

    let report = engine.verify_bytes(content, &network()).await.unwrap();
    assert_eq!(report.verdict, Verdict::Verified);
}

#[tokio::test]
async fn declined_signer_registers_nothing() {
    let engine = engine();
    let signer = DecliningSigner::new();

    let result = engine
        .register(
            b"work",
            BTreeMap::new(),
            ContentVisibility::Private,
            &signer,
            &network(),
        )
        .await;

    assert!(matches!(result, Err(EngineError::Declined)));
    assert!(engine.blob_store().is_empty());
    assert_eq!(
        engine
            .registry()
            .read(&Fingerprint::of(b"work"), &network())
            .await
            .unwrap(),
        RegistryLookup::Absent
    );
}

#[tokio::test]
async fn same_claimant_reregistration_is_surfaced() {
    let engine = engine();
    let signer = KeypairSigner::from_seed(&[0x03; 32]);
    let content = b"already mine";

    engine
        .register(
            content,
            BTreeMap::new(),
            ContentVisibility::Public,
            &signer,
            &network(),
        )
        .await
        .unwrap();

    let result = engine
        .register(
            content,
            BTreeMap::new(),
            ContentVisibility::Public,
            &signer,
            &network(),
        )
        .await;

    match result {
        Err(EngineError::AlreadyRegistered { existing }) => {
            assert_eq!(existing.claimant, signer.claimant());
        }
        other => panic!("expected AlreadyRegistered, got {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_registration_race_yields_one_conflict() {
    let engine = engine();
    let first = KeypairSigner::from_seed(&[0x0a; 32]);
    let second = KeypairSigner::from_seed(&[0x0b; 32]);
    let content = b"contested work";

    let first_network = network();
    let second_network = network();
    let (a, b) = tokio::join!(
        engine.register(
            content,
            BTreeMap::new(),
            ContentVisibility::Public,
            &first,
            &first_network,
        ),
        engine.register(
            content,
            BTreeMap::new(),
            ContentVisibility::Public,
            &second,
            &second_network,
        ),
    );

    // Exactly one receipt, one conflict carrying the winner's record.
    assert!(
        a.is_ok() != b.is_ok(),
        "expected exactly one success: {a:?} / {b:?}"
    );
    let (winner, loser) = if a.is_ok() {
        (a.unwrap(), b.unwrap_err())
    } else {
        (b.unwrap(), a.unwrap_err())
    };

    match loser {
        EngineError::Conflict { existing } => {
            assert_eq!(existing.claimant, winner.manifest.manifest.claimant);
            assert_eq!(existing.manifest_locator, winner.manifest_locator);
        }
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn registration_is_network_scoped() {
    let engine = engine();
    let signer = KeypairSigner::from_seed(&[0x04; 32]);
    let content = b"multi-network work";
    let mainnet = Network::new("mainnet");
    let testnet = Network::new("testnet");

    engine
        .register(
            content,
            BTreeMap::new(),
            ContentVisibility::Public,
            &signer,
            &mainnet,
        )
        .await
        .unwrap();

    // Absent on the other network, and the report names the network asked.
    let report = engine.verify_bytes(content, &testnet).await.unwrap();
    assert_eq!(report.verdict, Verdict::NotVerified);
    assert_eq!(report.network, testnet);

    // Re-registering the same content on a second network is not a conflict.
    let registration = engine
        .register(
            content,
            BTreeMap::new(),
            ContentVisibility::Public,
            &signer,
            &testnet,
        )
        .await
        .unwrap();
    assert_eq!(registration.fingerprint, Fingerprint::of(content));
}

#[tokio::test]
async fn pending_registration_reports_pending() {
    let engine = pending_engine();
    let signer = KeypairSigner::from_seed(&[0x05; 32]);
    let content = b"awaiting confirmation";

    let registration = engine
        .register(
            content,
            BTreeMap::new(),
            ContentVisibility::Public,
            &signer,
            &network(),
        )
        .await
        .unwrap();

    let report = engine.verify_bytes(content, &network()).await.unwrap();
    assert_eq!(report.verdict, Verdict::Pending);
    assert_eq!(report.registry_claimant, Some(signer.claimant()));

    // Pending lookups are never cached, so confirmation is visible at once.
    engine
        .registry()
        .confirm(&registration.fingerprint, &network());
    let report = engine.verify_bytes(content, &network()).await.unwrap();
    assert_eq!(report.verdict, Verdict::Verified);
}

// ─────────────────────────────────────────────────────────────────────────
// Bindings + platform verification
// ─────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn bind_then_verify_platform_locator() {
    let engine = engine();
    let signer = KeypairSigner::from_seed(&[0x10; 32]);
    let content = b"video master file";

    let registration = engine
        .register(
            content,
            BTreeMap::new(),
            ContentVisibility::Public,
            &signer,
            &network(),
        )
        .await
        .unwrap();

    let result = engine
        .bind(
            registration.fingerprint,
            "youtube",
            "https://youtube.com/watch?v=abc123xyz_Q",
            &signer.claimant(),
            &network(),
        )
        .await
        .unwrap();
    assert!(matches!(result, BindResult::Bound { .. }));

    // Verification by a different spelling of the same locator.
    let report = engine
        .verify_platform("youtube", "abc123xyz_Q", &network())
        .await
        .unwrap();

    // Full success through a binding is PlatformVerified, never Verified:
    // the live platform bytes were not compared.
    assert_eq!(report.verdict, Verdict::PlatformVerified);
    assert_eq!(report.fingerprint, Some(registration.fingerprint));
    assert_eq!(report.recovered_claimant, Some(signer.claimant()));
}

#[tokio::test]
async fn verify_unbound_platform_locator_is_not_verified() {
    let engine = engine();

    let report = engine
        .verify_platform("youtube", "https://youtu.be/abc123xyz_Q", &network())
        .await
        .unwrap();

    assert_eq!(report.verdict, Verdict::NotVerified);
    assert_eq!(report.miss, Some(MissReason::NoBindingOnNetwork));
}

#[tokio::test]
async fn verify_malformed_platform_locator_is_invalid() {
    let engine = engine();

    let report = engine
        .verify_platform("youtube", "https://example.com/watch?v=abc", &network())
        .await
        .unwrap();

    // Malformed input is Invalid, distinct from NotVerified.
    assert_eq!(report.verdict, Verdict::Invalid);
    assert!(matches!(
        report.invalid,
        Some(InvalidReason::UnrecognizedLocator(_))
    ));
}

#[tokio::test]
async fn bind_requires_registration() {
    let engine = engine();
    let claimant = Keypair::generate().claimant();

    let result = engine
        .bind(
            Fingerprint::of(b"unregistered"),
            "youtube",
            "abc123xyz_Q",
            &claimant,
            &network(),
        )
        .await;

    assert!(matches!(result, Err(EngineError::Unregistered { .. })));
}

#[tokio::test]
async fn bind_while_pending_is_rejected() {
    let engine = pending_engine();
    let signer = KeypairSigner::from_seed(&[0x11; 32]);

    let registration = engine
        .register(
            b"video",
            BTreeMap::new(),
            ContentVisibility::Public,
            &signer,
            &network(),
        )
        .await
        .unwrap();

    let result = engine
        .bind(
            registration.fingerprint,
            "youtube",
            "abc123xyz_Q",
            &signer.claimant(),
            &network(),
        )
        .await;

    assert!(matches!(
        result,
        Err(EngineError::RegistrationPending { .. })
    ));
}

#[tokio::test]
async fn bind_by_non_owner_is_rejected() {
    let engine = engine();
    let owner = KeypairSigner::from_seed(&[0x12; 32]);
    let intruder = Keypair::from_seed(&[0x13; 32]).claimant();

    let registration = engine
        .register(
            b"video",
            BTreeMap::new(),
            ContentVisibility::Public,
            &owner,
            &network(),
        )
        .await
        .unwrap();

    let result = engine
        .bind(
            registration.fingerprint,
            "youtube",
            "abc123xyz_Q",
            &intruder,
            &network(),
        )
        .await;

    match result {
        Err(EngineError::NotOwner {
            claimant,
            registry_claimant,
        }) => {
            assert_eq!(claimant, intruder);
            assert_eq!(registry_claimant, owner.claimant());
        }
        other => panic!("expected NotOwner, got {other:?}"),
    }

    // The rejected bind created nothing.
    assert!(engine
        .bindings(&registration.fingerprint, &network())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn binding_is_idempotent() {
    let engine = engine();
    let signer = KeypairSigner::from_seed(&[0x14; 32]);

    let registration = engine
        .register(
            b"video",
            BTreeMap::new(),
            ContentVisibility::Public,
            &signer,
            &network(),
        )
        .await
        .unwrap();

    let first = engine
        .bind(
            registration.fingerprint,
            "youtube",
            "https://youtu.be/abc123xyz_Q",
            &signer.claimant(),
            &network(),
        )
        .await
        .unwrap();
    assert!(matches!(first, BindResult::Bound { .. }));

    // Same locator in a different spelling: still the same binding.
    let second = engine
        .bind(
            registration.fingerprint,
            "youtube",
            "https://www.youtube.com/watch?v=abc123xyz_Q",
            &signer.claimant(),
            &network(),
        )
        .await
        .unwrap();
    assert!(matches!(second, BindResult::AlreadyBound { .. }));
    assert_eq!(first.binding(), second.binding());

    assert_eq!(
        engine
            .bindings(&registration.fingerprint, &network())
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn bind_all_reports_per_item_outcomes() {
    let engine = engine();
    let signer = KeypairSigner::from_seed(&[0x15; 32]);

    let registration = engine
        .register(
            b"multi-platform release",
            BTreeMap::new(),
            ContentVisibility::Public,
            &signer,
            &network(),
        )
        .await
        .unwrap();

    let outcomes = engine
        .bind_all(
            registration.fingerprint,
            vec![
                BindRequest::new("youtube", "https://youtu.be/abc123xyz_Q"),
                BindRequest::new("vimeo", "not-a-vimeo-id"),
                BindRequest::new("soundcloud", "artist/track-name"),
            ],
            &signer.claimant(),
            &network(),
        )
        .await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].outcome.is_ok());
    assert!(matches!(
        outcomes[1].outcome,
        Err(EngineError::Binding(_))
    ));
    assert!(outcomes[2].outcome.is_ok());

    // The malformed item blocked nothing.
    assert_eq!(
        engine
            .bindings(&registration.fingerprint, &network())
            .await
            .unwrap()
            .len(),
        2
    );
}

// ─────────────────────────────────────────────────────────────────────────
// Tampering + inconsistency
// ─────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn tampered_manifest_is_invalid_by_manifest_reference() {
    let engine = engine();
    let signer = KeypairSigner::from_seed(&[0x20; 32]);

    let registration = engine
        .register(
            b"work",
            metadata(),
            ContentVisibility::Public,
            &signer,
            &network(),
        )
        .await
        .unwrap();

    // Tamper with the persisted manifest's metadata after signing.
    let mut tampered = registration.manifest.clone();
    tampered
        .manifest
        .metadata
        .insert("title".to_string(), json!("Stolen Work"));
    engine.blob_store().corrupt(
        &registration.manifest_locator,
        tampered.to_json().unwrap(),
    );

    let report = engine
        .verify_manifest(&registration.manifest_locator, &network())
        .await
        .unwrap();

    assert_eq!(report.verdict, Verdict::Invalid);
    assert_eq!(report.invalid, Some(InvalidReason::BadSignature));
}

#[tokio::test]
async fn tampered_manifest_is_invalid_by_bytes() {
    let engine = engine();
    let signer = KeypairSigner::from_seed(&[0x21; 32]);
    let content = b"work";

    let registration = engine
        .register(
            content,
            BTreeMap::new(),
            ContentVisibility::Public,
            &signer,
            &network(),
        )
        .await
        .unwrap();

    let mut tampered = registration.manifest.clone();
    tampered
        .manifest
        .metadata
        .insert("license".to_string(), json!("all-rights-reserved"));
    engine.blob_store().corrupt(
        &registration.manifest_locator,
        tampered.to_json().unwrap(),
    );

    let report = engine.verify_bytes(content, &network()).await.unwrap();
    assert_eq!(report.verdict, Verdict::Invalid);
    assert_eq!(report.invalid, Some(InvalidReason::BadSignature));
}

#[tokio::test]
async fn wrong_signer_is_distinct_from_bad_signature() {
    let engine = engine();
    let owner = KeypairSigner::from_seed(&[0x22; 32]);
    let impostor = Keypair::from_seed(&[0x23; 32]);
    let content = b"work";

    let registration = engine
        .register(
            content,
            BTreeMap::new(),
            ContentVisibility::Public,
            &owner,
            &network(),
        )
        .await
        .unwrap();

    // Replace the stored manifest with one validly signed by an impostor
    // over the same fingerprint. The signature itself verifies; the
    // signer is simply not who the registry records.
    let forged = ManifestBuilder::new(registration.fingerprint, impostor.claimant())
        .created_at(1_736_870_400_000)
        .build()
        .unwrap();
    let forged_canonical = canonical_manifest_bytes(&forged).unwrap();
    let forged = forged.into_signed(impostor.sign(&forged_canonical));
    engine
        .blob_store()
        .corrupt(&registration.manifest_locator, forged.to_json().unwrap());

    let report = engine.verify_bytes(content, &network()).await.unwrap();
    assert_eq!(report.verdict, Verdict::Invalid);
    match report.invalid {
        Some(InvalidReason::ClaimantMismatch {
            recovered,
            expected,
        }) => {
            assert_eq!(recovered, impostor.claimant());
            assert_eq!(expected, owner.claimant());
        }
        other => panic!("expected ClaimantMismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn swapped_manifest_reference_is_invalid() {
    let engine = engine();
    let signer = KeypairSigner::from_seed(&[0x24; 32]);
    let content = b"work";

    let registration = engine
        .register(
            content,
            BTreeMap::new(),
            ContentVisibility::Public,
            &signer,
            &network(),
        )
        .await
        .unwrap();

    // A second manifest for the same fingerprint, validly signed by the
    // same claimant, persisted but never anchored.
    let replacement = ManifestBuilder::new(registration.fingerprint, signer.claimant())
        .created_at(1_736_870_400_000)
        .metadata_entry("title", json!("Revised"))
        .build()
        .unwrap();
    let canonical = canonical_manifest_bytes(&replacement).unwrap();
    let replacement = replacement.into_signed(signer.sign(&canonical).await.unwrap());
    let replacement_locator = engine
        .blob_store()
        .put(&replacement.to_json().unwrap())
        .await
        .unwrap();

    let report = engine
        .verify_manifest(&replacement_locator, &network())
        .await
        .unwrap();

    assert_eq!(report.verdict, Verdict::Invalid);
    match report.invalid {
        Some(InvalidReason::ManifestSwapped {
            registry_locator,
            presented,
        }) => {
            assert_eq!(registry_locator, registration.manifest_locator);
            assert_eq!(presented, replacement_locator);
        }
        other => panic!("expected ManifestSwapped, got {other:?}"),
    }
}

#[tokio::test]
async fn anchored_manifest_verifies_by_reference() {
    let engine = engine();
    let signer = KeypairSigner::from_seed(&[0x25; 32]);

    let registration = engine
        .register(
            b"work",
            metadata(),
            ContentVisibility::Public,
            &signer,
            &network(),
        )
        .await
        .unwrap();

    let report = engine
        .verify_manifest(&registration.manifest_locator, &network())
        .await
        .unwrap();

    assert_eq!(report.verdict, Verdict::Verified);
    assert_eq!(report.fingerprint, Some(registration.fingerprint));
    assert_eq!(report.recovered_claimant, Some(signer.claimant()));
}

#[tokio::test]
async fn missing_manifest_reference_is_not_verified() {
    let engine = engine();
    let locator = provenir::BlobLocator::of(b"never stored");

    let report = engine.verify_manifest(&locator, &network()).await.unwrap();
    assert_eq!(report.verdict, Verdict::NotVerified);
    assert_eq!(report.miss, Some(MissReason::ManifestNotFound(locator)));
}

#[tokio::test]
async fn diverged_registry_surfaces_every_claimant() {
    let engine = engine();
    let signer = KeypairSigner::from_seed(&[0x26; 32]);
    let other = Keypair::from_seed(&[0x27; 32]).claimant();
    let content = b"work";

    let registration = engine
        .register(
            content,
            BTreeMap::new(),
            ContentVisibility::Public,
            &signer,
            &network(),
        )
        .await
        .unwrap();

    engine.registry().inject_divergent_entry(
        provenir::RegistryEntry {
            fingerprint: registration.fingerprint,
            claimant: other,
            manifest_locator: provenir::BlobLocator::of(b"other manifest"),
            anchored_at: 1_736_870_400_000,
        },
        &network(),
    );

    let report = engine.verify_bytes(content, &network()).await.unwrap();
    assert_eq!(report.verdict, Verdict::Invalid);
    match report.invalid {
        Some(InvalidReason::DivergedRegistry { claimants }) => {
            assert_eq!(claimants.len(), 2);
            assert!(claimants.contains(&signer.claimant()));
            assert!(claimants.contains(&other));
        }
        other => panic!("expected DivergedRegistry, got {other:?}"),
    }
}
