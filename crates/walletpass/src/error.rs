//! Typed errors for pass generation.
//!
//! Every failure maps to one of four kinds so callers can tell
//! "fix your input" (Asset), "not configured" (Configuration),
//! "configured but cryptographically unusable" (Signing), and
//! "container constraint violated" (Packaging) apart. Nothing here is
//! retryable: each failure is deterministic for the same inputs.

use std::path::PathBuf;

/// Coarse classification of a generation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Asset,
    Configuration,
    Signing,
    Packaging,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Pass generation error.
///
/// Signing variants carry only OpenSSL's error text, never key material
/// or the passphrase.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing required asset(s): {}", .missing.join(", "))]
    MissingAssets { missing: Vec<String> },

    #[error("empty archive entry name")]
    EmptyEntryName,

    #[error("entry name '{name}' is reserved")]
    ReservedEntryName { name: String },

    #[error("duplicate archive entry '{name}'")]
    DuplicateEntryName { name: String },

    #[error("failed to read asset '{name}' from {}", .path.display())]
    UnreadableAsset {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read asset '{name}' from stream")]
    UnreadableAssetStream {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("pass description is not serializable as canonical JSON")]
    CanonicalJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("{what} not found at {}", .path.display())]
    CredentialNotFound { what: &'static str, path: PathBuf },

    #[error("failed to read {what} from {}", .path.display())]
    CredentialUnreadable {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open pass certificate container (bad passphrase or corrupt PKCS#12)")]
    Pkcs12Invalid {
        #[source]
        source: openssl::error::ErrorStack,
    },

    #[error("pass certificate container holds no {missing}")]
    Pkcs12Incomplete { missing: &'static str },

    #[error("trust-chain certificate is malformed")]
    TrustCertInvalid {
        #[source]
        source: openssl::error::ErrorStack,
    },

    #[error("detached signing failed")]
    SignFailed {
        #[source]
        source: openssl::error::ErrorStack,
    },

    #[error("entry '{name}' is {len} bytes, over the {max}-byte archive limit")]
    EntryTooLarge { name: String, len: u64, max: u64 },

    #[error("entry name '{name}' exceeds the archive path-length limit")]
    EntryNameTooLong { name: String },

    #[error("failed to assemble archive")]
    Archive {
        #[source]
        source: zip::result::ZipError,
    },
}

impl Error {
    /// Which of the four failure classes this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingAssets { .. }
            | Error::EmptyEntryName
            | Error::ReservedEntryName { .. }
            | Error::DuplicateEntryName { .. }
            | Error::UnreadableAsset { .. }
            | Error::UnreadableAssetStream { .. }
            | Error::CanonicalJson { .. } => ErrorKind::Asset,
            Error::CredentialNotFound { .. } | Error::CredentialUnreadable { .. } => {
                ErrorKind::Configuration
            }
            Error::Pkcs12Invalid { .. }
            | Error::Pkcs12Incomplete { .. }
            | Error::TrustCertInvalid { .. }
            | Error::SignFailed { .. } => ErrorKind::Signing,
            Error::EntryTooLarge { .. }
            | Error::EntryNameTooLong { .. }
            | Error::Archive { .. } => ErrorKind::Packaging,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_the_taxonomy() {
        assert_eq!(
            Error::MissingAssets {
                missing: vec!["icon.png".into()]
            }
            .kind(),
            ErrorKind::Asset
        );
        assert_eq!(
            Error::CredentialNotFound {
                what: "pass certificate (.p12)",
                path: "/nope".into()
            }
            .kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            Error::Pkcs12Incomplete {
                missing: "private key"
            }
            .kind(),
            ErrorKind::Signing
        );
        assert_eq!(
            Error::EntryNameTooLong {
                name: "x".repeat(70_000)
            }
            .kind(),
            ErrorKind::Packaging
        );
    }

    #[test]
    fn missing_assets_message_lists_names() {
        let err = Error::MissingAssets {
            missing: vec!["icon.png".into(), "logo.png".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("icon.png"));
        assert!(msg.contains("logo.png"));
    }
}
