//! Canonical JSON encoding and stable hashing for serialized artifacts.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::errors::{DesError, ErrorInfo};

/// Serializes a payload to canonical JSON bytes: object keys sorted
/// recursively, no insignificant whitespace. Byte-identical across runs and
/// platforms for equal payloads.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, DesError> {
    let value = serde_json::to_value(value)
        .map_err(|err| DesError::Serde(ErrorInfo::new("json-encode", err.to_string())))?;
    let canonical = canonicalize(value);
    serde_json::to_vec(&canonical)
        .map_err(|err| DesError::Serde(ErrorInfo::new("json-encode", err.to_string())))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| (key, canonicalize(inner)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Computes a stable hexadecimal SHA-256 hash for the provided payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, DesError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(bytes);
    Ok(hex::encode(digest))
}
