//! pkpass container assembly.
//!
//! A `.pkpass` is a plain ZIP: every payload entry, then
//! `manifest.json`, then `signature`. The consumer does not care about
//! entry order, but the writer keeps it stable (payload in insertion
//! order, manifest, signature) and stamps a fixed timestamp so the same
//! inputs produce the same archive apart from the signature bytes.

use crate::error::{Error, Result};
use crate::manifest::{MANIFEST_NAME, SIGNATURE_NAME};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// ZIP32 per-entry ceiling. Larger entries need ZIP64, which wallet
/// consumers do not read; fail instead of truncating.
const MAX_ENTRY_BYTES: u64 = u32::MAX as u64;
/// The entry-name length field is 16 bits.
const MAX_NAME_BYTES: usize = u16::MAX as usize;

/// Write the final archive: `payload` entries in the given order, then
/// the manifest, then the detached signature.
pub fn write_archive(
    payload: &[(String, Vec<u8>)],
    manifest_bytes: &[u8],
    signature: &[u8],
) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for (name, bytes) in payload {
        write_entry(&mut writer, name, bytes)?;
    }
    write_entry(&mut writer, MANIFEST_NAME, manifest_bytes)?;
    write_entry(&mut writer, SIGNATURE_NAME, signature)?;

    let cursor = writer
        .finish()
        .map_err(|source| Error::Archive { source })?;
    Ok(cursor.into_inner())
}

fn write_entry(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    bytes: &[u8],
) -> Result<()> {
    if name.len() > MAX_NAME_BYTES {
        return Err(Error::EntryNameTooLong { name: name.into() });
    }
    if bytes.len() as u64 > MAX_ENTRY_BYTES {
        return Err(Error::EntryTooLarge {
            name: name.into(),
            len: bytes.len() as u64,
            max: MAX_ENTRY_BYTES,
        });
    }

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(zip_timestamp())
        .unix_permissions(0o644)
        .large_file(false);

    writer
        .start_file(name, options)
        .map_err(|source| Error::Archive { source })?;
    writer
        .write_all(bytes)
        .map_err(|source| Error::Archive {
            source: source.into(),
        })?;
    Ok(())
}

fn zip_timestamp() -> DateTime {
    // DOS epoch; keeps repeated builds byte-comparable in tests.
    DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0).unwrap_or_else(|_| DateTime::default())
}
