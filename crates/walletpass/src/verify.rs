//! Independent verification of a finished `.pkpass`.
//!
//! Mirrors what the consuming platform does: re-compute every digest
//! against `manifest.json`, insist the manifest's entry set equals the
//! archive's payload entry set exactly, and verify the detached PKCS#7
//! signature over the manifest bytes against a caller-supplied trust
//! root. Used by the test suite and the CLI; generation never depends
//! on it.

use crate::digest::sha1_hex;
use crate::manifest::{Manifest, MANIFEST_NAME, SIGNATURE_NAME};
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::X509;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};

/// Why a pass failed verification.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("not a readable ZIP archive")]
    MalformedArchive(#[source] zip::result::ZipError),

    #[error("failed to read entry '{name}'")]
    UnreadableEntry {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate entry '{name}'")]
    DuplicateEntry { name: String },

    #[error("archive has no {MANIFEST_NAME}")]
    MissingManifest,

    #[error("archive has no {SIGNATURE_NAME}")]
    MissingSignature,

    #[error("{MANIFEST_NAME} is not valid JSON")]
    MalformedManifest(#[source] serde_json::Error),

    #[error("entry '{name}' is in the manifest but not the archive")]
    MissingEntry { name: String },

    #[error("entry '{name}' is in the archive but not the manifest")]
    UnexpectedEntry { name: String },

    #[error("digest mismatch for '{name}': manifest says {expected}, content is {actual}")]
    DigestMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("trust root certificate is unusable")]
    TrustRootInvalid(#[source] openssl::error::ErrorStack),

    #[error("signature entry is not a PKCS#7 structure")]
    MalformedSignature(#[source] openssl::error::ErrorStack),

    #[error("signature does not verify against {MANIFEST_NAME}")]
    SignatureInvalid(#[source] openssl::error::ErrorStack),
}

/// What a verified pass looked like.
#[derive(Debug)]
pub struct VerifyReport {
    /// The parsed manifest.
    pub manifest: Manifest,
    /// Number of payload entries (assets + pass.json).
    pub payload_entries: usize,
}

/// Verify `pkpass` end to end against `trust_root` (PEM or DER).
pub fn verify_pkpass(pkpass: &[u8], trust_root: &[u8]) -> Result<VerifyReport, VerifyError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(pkpass)).map_err(VerifyError::MalformedArchive)?;

    let mut entries: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(VerifyError::MalformedArchive)?;
        let name = entry.name().to_string();
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(|source| VerifyError::UnreadableEntry {
                name: name.clone(),
                source,
            })?;
        if entries.insert(name.clone(), content).is_some() {
            return Err(VerifyError::DuplicateEntry { name });
        }
    }

    let manifest_bytes = entries
        .remove(MANIFEST_NAME)
        .ok_or(VerifyError::MissingManifest)?;
    let signature_bytes = entries
        .remove(SIGNATURE_NAME)
        .ok_or(VerifyError::MissingSignature)?;

    let manifest = Manifest::parse(&manifest_bytes).map_err(VerifyError::MalformedManifest)?;

    // Exact entry-set equality: no omissions, no extras.
    for name in manifest.names() {
        if !entries.contains_key(name) {
            return Err(VerifyError::MissingEntry { name: name.into() });
        }
    }
    for name in entries.keys() {
        if manifest.digest_for(name).is_none() {
            return Err(VerifyError::UnexpectedEntry { name: name.clone() });
        }
    }

    for (name, content) in &entries {
        let actual = sha1_hex(content);
        let expected = manifest
            .digest_for(name)
            .unwrap_or_default()
            .to_string();
        if actual != expected {
            return Err(VerifyError::DigestMismatch {
                name: name.clone(),
                expected,
                actual,
            });
        }
    }

    verify_signature(&signature_bytes, &manifest_bytes, trust_root)?;

    Ok(VerifyReport {
        payload_entries: manifest.len(),
        manifest,
    })
}

/// Verify a detached PKCS#7 `signature` over `content` against
/// `trust_root`. Exposed separately so tests can probe mutation
/// sensitivity without rebuilding archives.
pub fn verify_signature(
    signature: &[u8],
    content: &[u8],
    trust_root: &[u8],
) -> Result<(), VerifyError> {
    let root = X509::from_pem(trust_root)
        .or_else(|_| X509::from_der(trust_root))
        .map_err(VerifyError::TrustRootInvalid)?;
    let mut store = X509StoreBuilder::new().map_err(VerifyError::TrustRootInvalid)?;
    store
        .add_cert(root)
        .map_err(VerifyError::TrustRootInvalid)?;
    let store = store.build();

    // Signer and intermediate certificates travel inside the signature.
    let extra_certs = Stack::new().map_err(VerifyError::TrustRootInvalid)?;

    let pkcs7 = Pkcs7::from_der(signature).map_err(VerifyError::MalformedSignature)?;
    pkcs7
        .verify(
            &extra_certs,
            &store,
            Some(content),
            None,
            Pkcs7Flags::BINARY,
        )
        .map_err(VerifyError::SignatureInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_zip_input() {
        let err = verify_pkpass(b"definitely not a zip", b"").unwrap_err();
        assert!(matches!(err, VerifyError::MalformedArchive(_)));
    }

    #[test]
    fn rejects_archive_without_manifest() {
        let payload = vec![("icon.png".to_string(), b"ICON".to_vec())];
        // write_archive always emits a manifest, so build a bare zip here.
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in &payload {
            writer
                .start_file(name, zip::write::SimpleFileOptions::default())
                .unwrap();
            std::io::Write::write_all(&mut writer, bytes).unwrap();
        }
        let bytes = writer.finish().unwrap().into_inner();

        let err = verify_pkpass(&bytes, b"").unwrap_err();
        assert!(matches!(err, VerifyError::MissingManifest));
    }
}
