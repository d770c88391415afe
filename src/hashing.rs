//! Hashing - SHA-256 fingerprints for build reports
//!
//! Content hashes are taken over canonical JSON so key order never matters.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Canonical JSON: sorted keys at every depth, no whitespace
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&sorted(serde_json::to_value(value)?))
}

// Sorted explicitly: with `preserve_order` a `Map` keeps insertion order.
fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let entries: BTreeMap<String, Value> = map.into_iter().map(|(k, v)| (k, sorted(v))).collect();
            Value::Object(entries.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// Hash of the document content that produced a PDF
pub fn compute_content_hash<T: Serialize>(document: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(document)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorted() {
        let obj = json!({"z": 1, "a": 2, "m": 3});
        assert_eq!(canonical_json(&obj).unwrap(), r#"{"a":2,"m":3,"z":1}"#);
    }

    #[derive(Serialize)]
    struct Unsorted {
        zeta: u8,
        alpha: Vec<Inner>,
    }

    #[derive(Serialize)]
    struct Inner {
        y: u8,
        b: u8,
    }

    #[test]
    fn test_canonical_json_sorts_struct_fields_at_depth() {
        let value = Unsorted { zeta: 1, alpha: vec![Inner { y: 2, b: 3 }] };
        assert_eq!(canonical_json(&value).unwrap(), r#"{"alpha":[{"b":3,"y":2}],"zeta":1}"#);
    }

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_content_hash_ignores_key_order() {
        let a = json!({"title": "Deck", "pages": [{"b": 1, "a": 2}]});
        let b = json!({"pages": [{"a": 2, "b": 1}], "title": "Deck"});
        assert_eq!(compute_content_hash(&a).unwrap(), compute_content_hash(&b).unwrap());
    }
}
