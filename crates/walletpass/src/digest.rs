//! Content fingerprints for manifest entries.
//!
//! Apple Wallet verifies `manifest.json` by re-computing a SHA-1 digest
//! for every archive entry. SHA-1 here is an interoperability constraint
//! imposed by the consuming platform, not a security choice; substituting
//! a stronger hash makes every pass unreadable on device.

use sha1::{Digest, Sha1};

/// Lowercase-hex SHA-1 of `bytes`.
///
/// Pure and deterministic: identical bytes always produce the identical
/// fingerprint, which is what makes `manifest.json` reproducible.
pub fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    // SHA-1 is what the wallet platform mandates for manifest digests;
    // these vectors pin the legacy algorithm on purpose.
    #[test]
    fn known_vectors() {
        assert_eq!(sha1_hex(b""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn output_is_lowercase_hex() {
        let digest = sha1_hex(b"ICONBYTES");
        assert_eq!(digest.len(), 40);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn deterministic_for_identical_bytes() {
        assert_eq!(sha1_hex(b"payload"), sha1_hex(b"payload"));
        assert_ne!(sha1_hex(b"payload"), sha1_hex(b"payloae"));
    }
}
