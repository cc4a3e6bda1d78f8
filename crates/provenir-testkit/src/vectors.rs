//! Golden canonical-JSON vectors.
//!
//! Every implementation that exchanges manifests must produce these exact
//! canonical bytes for these inputs, or third parties cannot re-derive
//! signed messages. Signatures are deliberately absent: the vectors pin
//! the signed *message*, which any Ed25519 implementation can then sign.

use serde::Serialize;
use serde_json::{json, Value};

use provenir_core::{
    canonical_manifest_bytes, BlobLocator, Claimant, Fingerprint, Manifest, ManifestBuilder,
};

/// A single golden vector: manifest inputs and the exact canonical bytes
/// they must produce.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    pub name: &'static str,
    pub description: &'static str,

    // Inputs
    pub fingerprint: [u8; 32],
    pub claimant: [u8; 32],
    pub content_locator: Option<[u8; 32]>,
    pub created_at: i64,
    pub metadata: Value,

    // Expected canonical encoding of the unsigned manifest.
    pub expected_canonical: &'static str,
}

impl GoldenVector {
    /// Build the unsigned manifest this vector describes.
    pub fn build_manifest(&self) -> Manifest {
        let metadata = match &self.metadata {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => panic!("vector metadata must be an object"),
        };

        let mut builder = ManifestBuilder::new(
            Fingerprint::from_bytes(self.fingerprint),
            Claimant::from_bytes(self.claimant),
        )
        .created_at(self.created_at)
        .metadata(metadata);

        if let Some(digest) = self.content_locator {
            builder = builder.content_locator(BlobLocator::from_bytes(digest));
        }

        builder.build().expect("vector metadata is canonical")
    }
}

/// All golden vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "minimal",
            description: "No content locator, empty metadata, epoch timestamp",
            fingerprint: [0x11; 32],
            claimant: [0x22; 32],
            content_locator: None,
            created_at: 0,
            metadata: json!({}),
            expected_canonical: r#"{"claimant":"2222222222222222222222222222222222222222222222222222222222222222","created_at":0,"fingerprint":"1111111111111111111111111111111111111111111111111111111111111111","metadata":{},"version":0}"#,
        },
        GoldenVector {
            name: "full",
            description: "Content locator plus mixed metadata, keys sorted",
            fingerprint: [0xaa; 32],
            claimant: [0x33; 32],
            content_locator: Some([0xbb; 32]),
            created_at: 1_736_870_400_000,
            metadata: json!({"title": "Golden", "n": 42, "tags": ["x", "y"]}),
            expected_canonical: r#"{"claimant":"3333333333333333333333333333333333333333333333333333333333333333","content_locator":"b3://bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb","created_at":1736870400000,"fingerprint":"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa","metadata":{"n":42,"tags":["x","y"],"title":"Golden"},"version":0}"#,
        },
        GoldenVector {
            name: "escapes",
            description: "Metadata exercising the minimal-escape rules",
            fingerprint: [0x44; 32],
            claimant: [0x55; 32],
            content_locator: None,
            created_at: 5,
            metadata: json!({"note": "line\nbreak \"q\" \\"}),
            expected_canonical: r#"{"claimant":"5555555555555555555555555555555555555555555555555555555555555555","created_at":5,"fingerprint":"4444444444444444444444444444444444444444444444444444444444444444","metadata":{"note":"line\nbreak \"q\" \\"},"version":0}"#,
        },
        GoldenVector {
            name: "nested_metadata",
            description: "Nested objects and negative integers",
            fingerprint: [0x66; 32],
            claimant: [0x77; 32],
            content_locator: None,
            created_at: 1_700_000_000_001,
            metadata: json!({"rights": {"year": 2026, "offset": -3}, "draft": false}),
            expected_canonical: r#"{"claimant":"7777777777777777777777777777777777777777777777777777777777777777","created_at":1700000000001,"fingerprint":"6666666666666666666666666666666666666666666666666666666666666666","metadata":{"draft":false,"rights":{"offset":-3,"year":2026}},"version":0}"#,
        },
    ]
}

/// Check every vector against the canonical encoder. Panics with the
/// vector name on the first mismatch.
pub fn verify_all_vectors() {
    for vector in all_vectors() {
        let manifest = vector.build_manifest();
        let canonical = canonical_manifest_bytes(&manifest).expect("canonical encoding");
        assert_eq!(
            canonical,
            vector.expected_canonical.as_bytes(),
            "canonical bytes mismatch for vector {}",
            vector.name
        );
    }
}
