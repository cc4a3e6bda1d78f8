//! # Provenir Testkit
//!
//! Testing utilities for the provenir engine.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: manifest inputs with their exact canonical bytes,
//!   for cross-implementation verification
//! - **Generators**: proptest strategies for property-based testing
//! - **Fixtures**: helper structs for setting up engine scenarios
//!
//! ## Golden Vectors
//!
//! ```rust
//! use provenir_testkit::vectors::verify_all_vectors;
//!
//! verify_all_vectors();
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use provenir_testkit::generators::{manifest_from_params, ManifestParams};
//!
//! proptest! {
//!     #[test]
//!     fn canonical_bytes_deterministic(params: ManifestParams) {
//!         let m1 = manifest_from_params(&params);
//!         let m2 = manifest_from_params(&params);
//!         prop_assert_eq!(m1.canonical_bytes().unwrap(), m2.canonical_bytes().unwrap());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use provenir_testkit::fixtures::{test_network, TestFixture};
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let registration = fixture
//!         .register(b"some content", &test_network())
//!         .await
//!         .unwrap();
//!     let _ = registration;
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, test_network, DecliningSigner, TestFixture};
pub use generators::{
    manifest_from_params, signed_manifest_from_params, ManifestParams,
};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
