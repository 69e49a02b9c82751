//! Detached PKCS#7 signing of the manifest.
//!
//! Apple validates a pass by verifying the `signature` entry, a
//! DER-encoded, content-detached, binary-mode PKCS#7 signed-data
//! structure, against the exact bytes of `manifest.json`, chaining the
//! signing certificate through the bundled WWDR intermediate up to its
//! trusted root. Signing is a pure function of its inputs; there is
//! nothing to retry.

use crate::error::{Error, Result};
use openssl::pkcs12::Pkcs12;
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::pkey::{PKey, Private};
use openssl::stack::Stack;
use openssl::x509::X509;
use std::path::{Path, PathBuf};

/// Credential material by reference: in-memory bytes or a file path.
///
/// Paths are resolved with a scoped read (open, read fully, close) at
/// identity-load time; the core never holds file handles across stages.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl CredentialSource {
    pub fn path(path: impl AsRef<Path>) -> Self {
        Self::Path(path.as_ref().to_path_buf())
    }

    fn load(&self, what: &'static str) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::Path(path) => {
                if !path.exists() {
                    return Err(Error::CredentialNotFound {
                        what,
                        path: path.clone(),
                    });
                }
                std::fs::read(path).map_err(|source| Error::CredentialUnreadable {
                    what,
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

/// Explicit, caller-constructed signing configuration.
///
/// There is deliberately no process-wide default to fall back on: every
/// pipeline call receives its credentials from the caller.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    /// PKCS#12 container holding the pass certificate and private key.
    pub p12: CredentialSource,
    /// Passphrase for the PKCS#12 container.
    pub p12_password: String,
    /// WWDR intermediate certificate (PEM or DER), bundled into the
    /// signature so the verifier can build the trust chain offline.
    pub wwdr: CredentialSource,
}

/// Parsed signing material. Lives for a single signing call.
#[derive(Debug)]
pub struct SigningIdentity {
    key: PKey<Private>,
    certificate: X509,
    wwdr: X509,
}

impl SigningIdentity {
    /// Load and parse credentials.
    ///
    /// Unreadable references fail as configuration errors before any
    /// cryptographic call; material that is present but cannot be
    /// decrypted or parsed fails as a signing error. Neither message
    /// carries key bytes or the passphrase.
    pub fn load(config: &SigningConfig) -> Result<Self> {
        let p12_bytes = config.p12.load("pass certificate (.p12)")?;
        let wwdr_bytes = config.wwdr.load("WWDR certificate")?;

        let parsed = Pkcs12::from_der(&p12_bytes)
            .and_then(|p12| p12.parse2(&config.p12_password))
            .map_err(|source| Error::Pkcs12Invalid { source })?;
        let key = parsed.pkey.ok_or(Error::Pkcs12Incomplete {
            missing: "private key",
        })?;
        let certificate = parsed.cert.ok_or(Error::Pkcs12Incomplete {
            missing: "certificate",
        })?;

        let wwdr = X509::from_pem(&wwdr_bytes)
            .or_else(|_| X509::from_der(&wwdr_bytes))
            .map_err(|source| Error::TrustCertInvalid { source })?;

        Ok(Self {
            key,
            certificate,
            wwdr,
        })
    }

    /// Signing certificate (for diagnostics; not the private key).
    pub fn certificate(&self) -> &X509 {
        &self.certificate
    }

    /// Produce the detached DER signature over `manifest_bytes`.
    ///
    /// DETACHED keeps the manifest out of the signature (it ships
    /// separately as `manifest.json`); BINARY suppresses the S/MIME
    /// text-mode canonicalization that would alter the signed bytes.
    pub fn sign_manifest(&self, manifest_bytes: &[u8]) -> Result<Vec<u8>> {
        let mut chain = Stack::new().map_err(|source| Error::SignFailed { source })?;
        chain
            .push(self.wwdr.clone())
            .map_err(|source| Error::SignFailed { source })?;

        let pkcs7 = Pkcs7::sign(
            &self.certificate,
            &self.key,
            &chain,
            manifest_bytes,
            Pkcs7Flags::DETACHED | Pkcs7Flags::BINARY,
        )
        .map_err(|source| Error::SignFailed { source })?;

        pkcs7
            .to_der()
            .map_err(|source| Error::SignFailed { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn missing_p12_path_is_a_configuration_error() {
        let config = SigningConfig {
            p12: CredentialSource::path("/definitely/not/here.p12"),
            p12_password: "password".into(),
            wwdr: CredentialSource::Bytes(Vec::new()),
        };
        let err = SigningIdentity::load(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(matches!(err, Error::CredentialNotFound { .. }));
    }

    #[test]
    fn corrupt_p12_bytes_are_a_signing_error() {
        let config = SigningConfig {
            p12: CredentialSource::Bytes(b"not a pkcs12 container".to_vec()),
            p12_password: "password".into(),
            wwdr: CredentialSource::Bytes(Vec::new()),
        };
        let err = SigningIdentity::load(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Signing);
    }

    #[test]
    fn signing_error_messages_leak_no_secret_material() {
        let config = SigningConfig {
            p12: CredentialSource::Bytes(b"garbage".to_vec()),
            p12_password: "hunter2-super-secret".into(),
            wwdr: CredentialSource::Bytes(Vec::new()),
        };
        let err = SigningIdentity::load(&config).unwrap_err();
        assert!(!err.to_string().contains("hunter2-super-secret"));
    }
}
