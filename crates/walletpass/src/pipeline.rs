//! The pass-generation pipeline.
//!
//! Stages run in a fixed order (validate, resolve, hash, sign,
//! package) and the first failure wins: no partial archive ever
//! escapes. Validation happens before any credential file is touched,
//! so a missing icon can never be misreported as a certificate problem.
//! The pipeline is stateless; concurrent invocations share nothing but
//! whatever read-only credential bytes the caller hands in.

use crate::archive::write_archive;
use crate::canon;
use crate::error::{Error, Result};
use crate::manifest::{validate_entry_name, Manifest, PASS_NAME};
use crate::sign::{SigningConfig, SigningIdentity};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Assets the platform refuses a pass without.
pub const REQUIRED_ASSETS: &[&str] = &["icon.png"];

/// Asset content by value, by path, or by stream.
///
/// Resolved to plain bytes once, at the pipeline boundary; everything
/// past validation only ever sees byte buffers.
pub enum AssetSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
    Reader(Box<dyn Read + Send>),
}

impl AssetSource {
    fn resolve(self, name: &str) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Path(path) => {
                std::fs::read(&path).map_err(|source| Error::UnreadableAsset {
                    name: name.into(),
                    path,
                    source,
                })
            }
            Self::Reader(mut reader) => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes).map_err(|source| {
                    Error::UnreadableAssetStream {
                        name: name.into(),
                        source,
                    }
                })?;
                Ok(bytes)
            }
        }
    }
}

/// Builds one signed `.pkpass` archive.
///
/// # Example
///
/// ```no_run
/// use walletpass::{CredentialSource, PkpassBuilder, SigningConfig};
///
/// let config = SigningConfig {
///     p12: CredentialSource::path("certs/pass.p12"),
///     p12_password: "secret".into(),
///     wwdr: CredentialSource::path("certs/wwdr.pem"),
/// };
///
/// let pkpass = PkpassBuilder::new(serde_json::json!({"formatVersion": 1}))
///     .asset_bytes("icon.png", b"ICONBYTES".to_vec())
///     .finish(&config)
///     .unwrap();
/// std::fs::write("card.pkpass", pkpass).unwrap();
/// ```
pub struct PkpassBuilder {
    description: serde_json::Value,
    assets: Vec<(String, AssetSource)>,
}

impl PkpassBuilder {
    /// Start a build from an opaque pass description. The description
    /// is serialized canonically into `pass.json`, so logically equal
    /// descriptions always hash identically.
    pub fn new(description: serde_json::Value) -> Self {
        Self {
            description,
            assets: Vec::new(),
        }
    }

    pub fn asset_bytes(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.assets.push((name.into(), AssetSource::Bytes(bytes)));
        self
    }

    pub fn asset_path(mut self, name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        self.assets.push((
            name.into(),
            AssetSource::Path(path.as_ref().to_path_buf()),
        ));
        self
    }

    pub fn asset_reader(
        mut self,
        name: impl Into<String>,
        reader: Box<dyn Read + Send>,
    ) -> Self {
        self.assets.push((name.into(), AssetSource::Reader(reader)));
        self
    }

    /// Run the pipeline and return the archive bytes.
    ///
    /// All-or-nothing: any stage failure returns that stage's typed
    /// error and nothing else.
    pub fn finish(self, config: &SigningConfig) -> Result<Vec<u8>> {
        // Validate before reading anything, credentials included.
        self.validate_asset_names()?;
        debug!(assets = self.assets.len(), "assets validated");

        let pass_bytes = canon::to_vec(&self.description)?;
        let mut payload = Vec::with_capacity(self.assets.len() + 1);
        payload.push((PASS_NAME.to_string(), pass_bytes));
        for (name, source) in self.assets {
            let bytes = source.resolve(&name)?;
            payload.push((name, bytes));
        }

        let manifest = Manifest::from_payload(
            payload.iter().map(|(name, bytes)| (name.as_str(), bytes.as_slice())),
        )?;
        let manifest_bytes = manifest.to_canonical_bytes()?;
        debug!(entries = manifest.len(), "manifest built");

        let identity = SigningIdentity::load(config)?;
        let signature = identity.sign_manifest(&manifest_bytes)?;
        debug!(signature_len = signature.len(), "manifest signed");

        let archive = write_archive(&payload, &manifest_bytes, &signature)?;
        debug!(archive_len = archive.len(), "archive packaged");
        Ok(archive)
    }

    fn validate_asset_names(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for (name, _) in &self.assets {
            validate_entry_name(name)?;
            // pass.json is emitted from the description, never supplied.
            if name == PASS_NAME || !seen.insert(name.as_str()) {
                return Err(if name == PASS_NAME {
                    Error::ReservedEntryName { name: name.clone() }
                } else {
                    Error::DuplicateEntryName { name: name.clone() }
                });
            }
        }

        let missing: Vec<String> = REQUIRED_ASSETS
            .iter()
            .filter(|required| !seen.contains(*required))
            .map(|required| (*required).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingAssets { missing });
        }
        Ok(())
    }
}

/// One-call convenience over [`PkpassBuilder`], mirroring the shape of
/// "description + named assets + credentials in, archive bytes out".
pub fn generate_pkpass(
    description: serde_json::Value,
    assets: impl IntoIterator<Item = (String, AssetSource)>,
    config: &SigningConfig,
) -> Result<Vec<u8>> {
    let mut builder = PkpassBuilder::new(description);
    for (name, source) in assets {
        builder.assets.push((name, source));
    }
    builder.finish(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sign::CredentialSource;

    fn unreachable_config() -> SigningConfig {
        SigningConfig {
            p12: CredentialSource::path("/nonexistent/pass.p12"),
            p12_password: "password".into(),
            wwdr: CredentialSource::path("/nonexistent/wwdr.pem"),
        }
    }

    #[test]
    fn missing_icon_fails_before_any_credential_read() {
        // The config points at paths that do not exist; if credentials
        // were touched first this would surface as a Configuration
        // error instead of the asset error we expect.
        let err = PkpassBuilder::new(serde_json::json!({"formatVersion": 1}))
            .asset_bytes("logo.png", b"LOGO".to_vec())
            .finish(&unreachable_config())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Asset);
        assert!(err.to_string().contains("icon.png"));
    }

    #[test]
    fn asset_named_pass_json_is_rejected() {
        let err = PkpassBuilder::new(serde_json::json!({}))
            .asset_bytes("icon.png", b"ICON".to_vec())
            .asset_bytes("pass.json", b"{}".to_vec())
            .finish(&unreachable_config())
            .unwrap_err();
        assert!(matches!(err, Error::ReservedEntryName { .. }));
    }

    #[test]
    fn reserved_and_duplicate_asset_names_are_rejected() {
        for reserved in ["manifest.json", "signature"] {
            let err = PkpassBuilder::new(serde_json::json!({}))
                .asset_bytes("icon.png", b"ICON".to_vec())
                .asset_bytes(reserved, b"x".to_vec())
                .finish(&unreachable_config())
                .unwrap_err();
            assert!(matches!(err, Error::ReservedEntryName { .. }), "{reserved}");
        }

        let err = PkpassBuilder::new(serde_json::json!({}))
            .asset_bytes("icon.png", b"ICON".to_vec())
            .asset_bytes("icon.png", b"ICON".to_vec())
            .finish(&unreachable_config())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEntryName { .. }));
    }

    #[test]
    fn unreadable_asset_path_is_an_asset_error() {
        let err = PkpassBuilder::new(serde_json::json!({}))
            .asset_bytes("icon.png", b"ICON".to_vec())
            .asset_path("strip.png", "/nonexistent/strip.png")
            .finish(&unreachable_config())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Asset);
        assert!(matches!(err, Error::UnreadableAsset { .. }));
    }

    #[test]
    fn valid_assets_with_missing_credentials_reach_configuration_stage() {
        let err = PkpassBuilder::new(serde_json::json!({"formatVersion": 1}))
            .asset_bytes("icon.png", b"ICON".to_vec())
            .finish(&unreachable_config())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
