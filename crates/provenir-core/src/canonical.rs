//! Canonical JSON encoding for deterministic serialization.
//!
//! Manifests are exchanged as JSON so any third party can re-derive the
//! signed bytes without this codebase. That only works if the encoding is
//! exact, so this module pins one:
//!
//! - Object keys sorted by UTF-8 byte comparison
//! - No insignificant whitespace
//! - Integers only (floats are rejected, timestamps are i64 milliseconds)
//! - Minimal string escapes (`\"`, `\\`, `\b`, `\t`, `\n`, `\f`, `\r`,
//!   `\u00XX` for other control characters)
//! - `null` rejected everywhere; an absent field is an absent key
//!
//! The signed message for a manifest is the canonical encoding of all
//! fields except `signature`. Re-serializing a decoded manifest minus its
//! signature reproduces exactly the bytes that were signed; a document
//! that fails to round-trip fails signature verification.

use serde_json::Value;

use crate::crypto::{ClaimSignature, Claimant};
use crate::error::CoreError;
use crate::fingerprint::Fingerprint;
use crate::locator::BlobLocator;
use crate::manifest::{Manifest, SignedManifest, MANIFEST_VERSION};

/// Manifest field keys, in canonical (byte-sorted) order.
mod keys {
    pub const CLAIMANT: &str = "claimant";
    pub const CONTENT_LOCATOR: &str = "content_locator";
    pub const CREATED_AT: &str = "created_at";
    pub const FINGERPRINT: &str = "fingerprint";
    pub const METADATA: &str = "metadata";
    pub const SIGNATURE: &str = "signature";
    pub const SIG: &str = "sig";
    pub const SIGNER: &str = "signer";
    pub const VERSION: &str = "version";
}

/// Encode the signed message for a manifest: every field except the
/// signature, in canonical JSON.
pub fn canonical_manifest_bytes(manifest: &Manifest) -> Result<Vec<u8>, CoreError> {
    let value = manifest_to_value(manifest, None);
    encode_canonical(&value)
}

/// Encode a complete signed manifest document for blob-store exchange.
///
/// Same canonical rules, with the `signature` field included.
pub fn signed_manifest_bytes(signed: &SignedManifest) -> Result<Vec<u8>, CoreError> {
    let value = manifest_to_value(&signed.manifest, Some(&signed.signature));
    encode_canonical(&value)
}

/// Convert a manifest to a JSON value (signature attached when given).
fn manifest_to_value(manifest: &Manifest, signature: Option<&ClaimSignature>) -> Value {
    let mut map = serde_json::Map::new();

    map.insert(
        keys::CLAIMANT.to_string(),
        Value::String(manifest.claimant.to_hex()),
    );

    if let Some(locator) = &manifest.content_locator {
        map.insert(
            keys::CONTENT_LOCATOR.to_string(),
            Value::String(locator.to_uri()),
        );
    }

    map.insert(keys::CREATED_AT.to_string(), Value::from(manifest.created_at));

    map.insert(
        keys::FINGERPRINT.to_string(),
        Value::String(manifest.fingerprint.to_hex()),
    );

    let metadata: serde_json::Map<String, Value> = manifest
        .metadata
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    map.insert(keys::METADATA.to_string(), Value::Object(metadata));

    if let Some(sig) = signature {
        let mut sig_map = serde_json::Map::new();
        sig_map.insert(keys::SIG.to_string(), Value::String(sig.sig_hex()));
        sig_map.insert(
            keys::SIGNER.to_string(),
            Value::String(hex::encode(sig.signer)),
        );
        map.insert(keys::SIGNATURE.to_string(), Value::Object(sig_map));
    }

    map.insert(keys::VERSION.to_string(), Value::from(manifest.version));

    Value::Object(map)
}

/// Encode a JSON value to canonical bytes.
pub fn encode_canonical(value: &Value) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value)?;
    Ok(buf)
}

/// Recursively encode a JSON value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) -> Result<(), CoreError> {
    match value {
        Value::Null => Err(CoreError::NullValue),
        Value::Bool(b) => {
            buf.extend_from_slice(if *b { b"true" } else { b"false" });
            Ok(())
        }
        Value::Number(n) => encode_number(buf, n),
        Value::String(s) => {
            encode_string(buf, s);
            Ok(())
        }
        Value::Array(items) => {
            buf.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                encode_value_to(buf, item)?;
            }
            buf.push(b']');
            Ok(())
        }
        Value::Object(map) => encode_object_canonical(buf, map),
    }
}

/// Encode a number. Integers only; floats have no canonical text form.
fn encode_number(buf: &mut Vec<u8>, n: &serde_json::Number) -> Result<(), CoreError> {
    if let Some(i) = n.as_i64() {
        buf.extend_from_slice(i.to_string().as_bytes());
        Ok(())
    } else if let Some(u) = n.as_u64() {
        buf.extend_from_slice(u.to_string().as_bytes());
        Ok(())
    } else {
        Err(CoreError::UnsupportedNumber(n.to_string()))
    }
}

/// Encode a string with minimal escapes.
fn encode_string(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for c in s.chars() {
        match c {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\u{08}' => buf.extend_from_slice(b"\\b"),
            '\t' => buf.extend_from_slice(b"\\t"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\u{0c}' => buf.extend_from_slice(b"\\f"),
            '\r' => buf.extend_from_slice(b"\\r"),
            c if (c as u32) < 0x20 => {
                buf.extend_from_slice(format!("\\u{:04x}", c as u32).as_bytes());
            }
            c => {
                let mut utf8 = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }
    buf.push(b'"');
}

/// Encode an object with keys sorted by UTF-8 byte comparison.
fn encode_object_canonical(
    buf: &mut Vec<u8>,
    map: &serde_json::Map<String, Value>,
) -> Result<(), CoreError> {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    buf.push(b'{');
    for (i, (key, value)) in entries.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        encode_string(buf, key);
        buf.push(b':');
        encode_value_to(buf, value)?;
    }
    buf.push(b'}');
    Ok(())
}

/// Check that a metadata value stays inside the canonical subset:
/// no nulls, no floats, recursively.
pub fn validate_value(value: &Value) -> Result<(), CoreError> {
    match value {
        Value::Null => Err(CoreError::NullValue),
        Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.as_i64().is_some() || n.as_u64().is_some() {
                Ok(())
            } else {
                Err(CoreError::UnsupportedNumber(n.to_string()))
            }
        }
        Value::Array(items) => items.iter().try_for_each(validate_value),
        Value::Object(map) => map.values().try_for_each(validate_value),
    }
}

/// Decode a signed manifest from a JSON document.
///
/// Field ordering in the input is not trusted; the decoded manifest is
/// always re-canonicalized before any signature check. Unknown fields are
/// rejected so a decoded manifest re-encodes to exactly one document.
pub fn decode_manifest(bytes: &[u8]) -> Result<SignedManifest, CoreError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let map = match value {
        Value::Object(m) => m,
        _ => return Err(CoreError::MalformedManifest("expected object".into())),
    };

    for key in map.keys() {
        match key.as_str() {
            keys::CLAIMANT
            | keys::CONTENT_LOCATOR
            | keys::CREATED_AT
            | keys::FINGERPRINT
            | keys::METADATA
            | keys::SIGNATURE
            | keys::VERSION => {}
            other => {
                return Err(CoreError::MalformedManifest(format!(
                    "unknown field: {other}"
                )))
            }
        }
    }

    let version = match map.get(keys::VERSION) {
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| CoreError::MalformedManifest("invalid version".into()))?,
        _ => return Err(CoreError::MalformedManifest("missing version".into())),
    };
    if version != MANIFEST_VERSION as u64 {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let fingerprint = match map.get(keys::FINGERPRINT) {
        Some(Value::String(s)) => Fingerprint::from_hex(s)
            .map_err(|_| CoreError::MalformedManifest("invalid fingerprint".into()))?,
        _ => return Err(CoreError::MalformedManifest("missing fingerprint".into())),
    };

    let claimant = match map.get(keys::CLAIMANT) {
        Some(Value::String(s)) => Claimant::from_hex(s)
            .map_err(|_| CoreError::MalformedManifest("invalid claimant".into()))?,
        _ => return Err(CoreError::MalformedManifest("missing claimant".into())),
    };

    let content_locator = match map.get(keys::CONTENT_LOCATOR) {
        Some(Value::String(s)) => Some(BlobLocator::parse(s)?),
        None => None,
        _ => {
            return Err(CoreError::MalformedManifest(
                "invalid content_locator".into(),
            ))
        }
    };

    let created_at = match map.get(keys::CREATED_AT) {
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| CoreError::MalformedManifest("invalid created_at".into()))?,
        _ => return Err(CoreError::MalformedManifest("missing created_at".into())),
    };

    let metadata = match map.get(keys::METADATA) {
        Some(Value::Object(m)) => {
            for v in m.values() {
                validate_value(v)?;
            }
            m.iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        }
        _ => return Err(CoreError::MalformedManifest("missing metadata".into())),
    };

    let signature = match map.get(keys::SIGNATURE) {
        Some(Value::Object(sig_map)) => {
            let sig_hex = match sig_map.get(keys::SIG) {
                Some(Value::String(s)) => s,
                _ => return Err(CoreError::MalformedManifest("missing signature.sig".into())),
            };
            let signer_hex = match sig_map.get(keys::SIGNER) {
                Some(Value::String(s)) => s,
                _ => {
                    return Err(CoreError::MalformedManifest(
                        "missing signature.signer".into(),
                    ))
                }
            };
            if sig_map.len() != 2 {
                return Err(CoreError::MalformedManifest(
                    "unexpected field in signature".into(),
                ));
            }

            let sig_bytes = hex::decode(sig_hex)
                .map_err(|_| CoreError::MalformedManifest("invalid signature hex".into()))?;
            let sig: [u8; 64] = sig_bytes
                .try_into()
                .map_err(|_| CoreError::MalformedManifest("signature must be 64 bytes".into()))?;

            let signer_bytes = hex::decode(signer_hex)
                .map_err(|_| CoreError::MalformedManifest("invalid signer hex".into()))?;
            let signer: [u8; 32] = signer_bytes
                .try_into()
                .map_err(|_| CoreError::MalformedManifest("signer must be 32 bytes".into()))?;

            ClaimSignature::from_parts(signer, sig)
        }
        _ => return Err(CoreError::MalformedManifest("missing signature".into())),
    };

    Ok(SignedManifest {
        manifest: Manifest {
            version: version as u8,
            fingerprint,
            content_locator,
            created_at,
            claimant,
            metadata,
        },
        signature,
    })
}
