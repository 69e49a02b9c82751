//! Canonical JSON (RFC 8785) for bytes that get hashed or signed.
//!
//! Both `pass.json` and `manifest.json` end up under a digest or a
//! detached signature, so their serialization must be byte-stable:
//! two independent serializations of the same logical value have to be
//! identical. `serde_jcs` guarantees lexicographic key order, no
//! insignificant whitespace, UTF-8, and IEEE 754 number normalization.

use crate::error::{Error, Result};
use serde::Serialize;

/// Serialize `value` to canonical JSON bytes.
pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_jcs::to_vec(value).map_err(|source| Error::CanonicalJson { source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_sorted_without_whitespace() {
        let bytes = to_vec(&json!({"z": 1, "a": {"c": 2, "b": 3}})).unwrap();
        assert_eq!(bytes, br#"{"a":{"b":3,"c":2},"z":1}"#);
    }

    #[test]
    fn deterministic_across_construction_order() {
        let one = to_vec(&json!({"a": 1, "b": 2})).unwrap();
        let two = to_vec(&json!({"b": 2, "a": 1})).unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn minimal_pass_description() {
        let bytes = to_vec(&json!({"formatVersion": 1})).unwrap();
        assert_eq!(bytes, br#"{"formatVersion":1}"#);
    }
}
