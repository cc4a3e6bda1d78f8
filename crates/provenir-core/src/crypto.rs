//! Claimant identities and manifest signatures.
//!
//! Wraps Ed25519 with strong types. A [`ClaimSignature`] carries the
//! signer's public key alongside the signature bytes, so the signing
//! identity can be recovered from a manifest's canonical bytes alone and
//! compared against whatever a registry claims.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// A 32-byte claimant identity (an Ed25519 public key).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claimant(pub [u8; 32]);

impl Claimant {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Claimant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Claimant({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Claimant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Claimant {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Claimant {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A claimant signature over a manifest's canonical bytes.
///
/// The signer's public key travels with the signature bytes. Ed25519 has
/// no key recovery, so bundling the key is what makes
/// [`recover_signer`] expressible: verify, then report the verified key.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSignature {
    /// The public key that produced the signature.
    pub signer: [u8; 32],
    /// The 64-byte Ed25519 signature.
    #[serde(with = "serde_sig")]
    pub sig: [u8; 64],
}

impl ClaimSignature {
    /// Create from raw parts.
    pub const fn from_parts(signer: [u8; 32], sig: [u8; 64]) -> Self {
        Self { signer, sig }
    }

    /// The signing identity this signature claims.
    pub fn claimed_signer(&self) -> Claimant {
        Claimant(self.signer)
    }

    /// Hex encoding of the signature bytes.
    pub fn sig_hex(&self) -> String {
        hex::encode(self.sig)
    }
}

impl fmt::Debug for ClaimSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClaimSignature(signer {}, sig {}...)",
            &hex::encode(self.signer)[..16],
            &self.sig_hex()[..16]
        )
    }
}

mod serde_sig {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(sig: &[u8; 64], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bytes(sig)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 64], D::Error> {
        let v = Vec::<u8>::deserialize(d)?;
        v.try_into()
            .map_err(|_| serde::de::Error::custom("signature must be 64 bytes"))
    }
}

/// Recover the signing identity from canonical bytes and a signature.
///
/// Succeeds only when the signature is valid for the bundled public key
/// over exactly these bytes. A tampered manifest, a forged signature, or
/// a garbage key all fail here; "wrong signer" is not detectable at this
/// layer and is the caller's comparison to make.
pub fn recover_signer(canonical: &[u8], signature: &ClaimSignature) -> Result<Claimant, CoreError> {
    let verifying_key =
        VerifyingKey::from_bytes(&signature.signer).map_err(|_| CoreError::InvalidPublicKey)?;

    let sig = Signature::from_bytes(&signature.sig);

    verifying_key
        .verify(canonical, &sig)
        .map_err(|_| CoreError::InvalidSignature)?;

    Ok(Claimant(signature.signer))
}

/// A keypair for signing manifests.
///
/// This wraps ed25519-dalek's SigningKey. Production deployments hold key
/// material in a wallet behind the async signer capability; this type backs
/// the in-process signer and tests.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the claimant identity for this keypair.
    pub fn claimant(&self) -> Claimant {
        Claimant(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message, producing a signature that carries the public key.
    pub fn sign(&self, message: &[u8]) -> ClaimSignature {
        let sig = self.signing_key.sign(message);
        ClaimSignature {
            signer: self.signing_key.verifying_key().to_bytes(),
            sig: sig.to_bytes(),
        }
    }

    /// Get the raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.claimant())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_recover() {
        let keypair = Keypair::generate();
        let message = b"canonical manifest bytes";
        let signature = keypair.sign(message);

        let recovered = recover_signer(message, &signature).expect("valid signature");
        assert_eq!(recovered, keypair.claimant());
    }

    #[test]
    fn test_recover_rejects_tampered_message() {
        let keypair = Keypair::generate();
        let signature = keypair.sign(b"original");

        let result = recover_signer(b"tampered", &signature);
        assert!(matches!(result, Err(CoreError::InvalidSignature)));
    }

    #[test]
    fn test_recover_rejects_swapped_signer() {
        let alice = Keypair::from_seed(&[0x01; 32]);
        let mallory = Keypair::from_seed(&[0x02; 32]);
        let message = b"claim";

        // Mallory re-labels Alice's signature with her own key.
        let mut signature = alice.sign(message);
        signature.signer = *mallory.claimant().as_bytes();

        let result = recover_signer(message, &signature);
        assert!(matches!(result, Err(CoreError::InvalidSignature)));
    }

    #[test]
    fn test_keypair_deterministic_from_seed() {
        let seed = [0x42u8; 32];
        let kp1 = Keypair::from_seed(&seed);
        let kp2 = Keypair::from_seed(&seed);
        assert_eq!(kp1.claimant(), kp2.claimant());
    }

    #[test]
    fn test_claimant_hex_roundtrip() {
        let claimant = Keypair::generate().claimant();
        let recovered = Claimant::from_hex(&claimant.to_hex()).unwrap();
        assert_eq!(claimant, recovered);
    }
}
