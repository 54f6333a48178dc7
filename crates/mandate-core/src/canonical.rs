//! JSON Canonicalization Scheme (RFC 8785) and mandate hashing.
//!
//! Object members are sorted by their UTF-16 code units (RFC 8785 §3.2.3),
//! recursively. This differs from code point order only for keys outside the
//! Basic Multilingual Plane. Scalars (strings, numbers, literals) are written
//! by `serde_jcs`:
//!
//! - Array order preserved
//! - No insignificant whitespace
//! - ECMAScript number formatting (1.0 → 1)
//!
//! Hashes are keccak-256 over the UTF-8 canonical bytes, rendered as `0x` +
//! 64 lowercase hex characters.

use alloy_primitives::B256;
use serde::Serialize;
use serde_json::Value;
use sha3::{Digest, Keccak256};

use crate::error::{MandateError, MandateResult};

/// Serialize a value to its JCS canonical string.
///
/// # Example
///
/// ```
/// use mandate_core::canonical;
/// use serde_json::json;
///
/// let s = canonical::to_string(&json!({"z": 1, "a": [3, 1]})).unwrap();
/// assert_eq!(s, r#"{"a":[3,1],"z":1}"#);
/// ```
pub fn to_string<T: Serialize>(value: &T) -> MandateResult<String> {
    let value = serde_json::to_value(value).map_err(|e| MandateError::Canonicalization {
        reason: e.to_string(),
    })?;
    let mut canonical = String::new();
    write_value(&mut canonical, &value)?;
    Ok(canonical)
}

fn write_value(out: &mut String, value: &Value) -> MandateResult<()> {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut members: Vec<(&String, &Value)> = map.iter().collect();
            members.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));
            out.push('{');
            for (i, (key, member)) in members.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&scalar(key)?);
                out.push(':');
                write_value(out, member)?;
            }
            out.push('}');
        }
        other => out.push_str(&scalar(other)?),
    }
    Ok(())
}

fn scalar<T: Serialize + ?Sized>(value: &T) -> MandateResult<String> {
    serde_jcs::to_string(value).map_err(|e| MandateError::Canonicalization {
        reason: e.to_string(),
    })
}

/// keccak-256 of arbitrary bytes.
pub fn keccak256(bytes: impl AsRef<[u8]>) -> B256 {
    let out = Keccak256::digest(bytes.as_ref());
    B256::from_slice(out.as_slice())
}

/// Canonicalize then hash.
pub fn hash<T: Serialize>(value: &T) -> MandateResult<B256> {
    Ok(keccak256(to_string(value)?.as_bytes()))
}

/// Render a digest as `0x` + lowercase hex.
pub fn hash_hex(hash: &B256) -> String {
    format!("0x{}", hex::encode(hash.as_slice()))
}

/// Parse a `0x`-prefixed 32-byte hex digest.
pub fn parse_hash(s: &str) -> MandateResult<B256> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| MandateError::malformed(format!("hash must be 0x-prefixed: {s}")))?;
    let bytes =
        hex::decode(digits).map_err(|e| MandateError::malformed(format!("invalid hash hex: {e}")))?;
    if bytes.len() != 32 {
        return Err(MandateError::malformed(format!(
            "hash must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(B256::from_slice(&bytes))
}
