//! The signed manifest: archive entry name → SHA-1 fingerprint.
//!
//! The manifest's canonical bytes are exactly what the detached
//! signature covers, so entry ordering is fixed (lexicographic via
//! `BTreeMap` + JCS) and the entry set must equal the archive's payload
//! entry set, nothing more and nothing less.

use crate::canon;
use crate::digest::sha1_hex;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entry name of the manifest itself.
pub const MANIFEST_NAME: &str = "manifest.json";
/// Entry name of the detached signature.
pub const SIGNATURE_NAME: &str = "signature";
/// Entry name of the serialized pass description.
pub const PASS_NAME: &str = "pass.json";

/// Names that payload entries may not use. `pass.json` is reserved too:
/// the pipeline emits it from the pass description, so an asset under
/// that name would be a duplicate.
pub const RESERVED_NAMES: &[&str] = &[MANIFEST_NAME, SIGNATURE_NAME];

/// Mapping of payload entry name to lowercase-hex SHA-1 digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    /// Digest every `(name, bytes)` payload pair into a manifest.
    ///
    /// Fails on an empty, reserved, or duplicated entry name. The
    /// caller is expected to have run [`validate_entry_name`] already
    /// for early rejection; this re-checks because these invariants are
    /// what the platform silently rejects passes over.
    pub fn from_payload<'a, I>(payload: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        let mut entries = BTreeMap::new();
        for (name, bytes) in payload {
            validate_entry_name(name)?;
            if entries
                .insert(name.to_string(), sha1_hex(bytes))
                .is_some()
            {
                return Err(Error::DuplicateEntryName { name: name.into() });
            }
        }
        Ok(Self { entries })
    }

    /// Parse a manifest from archive bytes (the verification path).
    pub fn parse(bytes: &[u8]) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Canonical bytes, the exact content the detached signature covers.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>> {
        canon::to_vec(self)
    }

    pub fn digest_for(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reject names the archive contract forbids for payload entries.
pub fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::EmptyEntryName);
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(Error::ReservedEntryName { name: name.into() });
    }
    Ok(())
}
