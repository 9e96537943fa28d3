//! Rom identity resolution.
//!
//! Derives the content-identifying keys (declared name, CRC-32 checksum,
//! size) that scraper lookups are built from. A checksum sidecar file
//! (`<rom>.crc`) always wins; a zip holding exactly one entry is treated as
//! transparent, taking the inner entry's stored name and CRC straight from
//! the central directory; everything else gets a streamed CRC-32 over the
//! file contents.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Outcome of checksum resolution for a rom file.
///
/// An *empty* sidecar is a deliberate marker, distinct from "no sidecar":
/// it means a previous lookup failed and a human has not yet filled in a
/// correct checksum, so CRC-based lookup must be skipped, not recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checksum {
    /// A usable checksum: 8 uppercase hex digits when computed, or whatever
    /// a nonempty sidecar declared, verbatim after trimming.
    Known(String),
    /// An empty sidecar file was present; the checksum is explicitly
    /// unknown.
    ExplicitUnknown,
}

impl Checksum {
    /// Returns the checksum string, or `None` when explicitly unknown.
    pub fn known(&self) -> Option<&str> {
        match self {
            Self::Known(crc) => Some(crc),
            Self::ExplicitUnknown => None,
        }
    }
}

/// Content-identifying keys for a candidate rom file.
#[derive(Debug, Clone)]
pub struct RomIdentity {
    /// Declared rom name. For a single-entry zip this is the inner entry's
    /// stored name, otherwise the file name on disk.
    pub name: String,
    /// Resolved checksum.
    pub checksum: Checksum,
    /// Size in bytes of the file on disk (the container itself, for zips).
    pub size: u64,
}

/// Resolve the identity of the rom at `path`.
///
/// Fails only when the path does not exist. Unreadable or multi-entry zip
/// archives fall through to a computed CRC over the container bytes.
pub fn resolve(path: &Path) -> Result<RomIdentity> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let size = std::fs::metadata(path)?.len();

    let sidecar = sidecar_path(path);
    if sidecar.exists() {
        let text = std::fs::read_to_string(&sidecar)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!(sidecar = %sidecar.display(), "empty checksum sidecar found");
            return Ok(RomIdentity {
                name: file_name,
                checksum: Checksum::ExplicitUnknown,
                size,
            });
        }
        debug!(sidecar = %sidecar.display(), "using checksum sidecar");
        return Ok(RomIdentity {
            name: file_name,
            checksum: Checksum::Known(trimmed.to_string()),
            size,
        });
    }

    if has_extension(path, "zip") {
        if let Some((inner_name, crc)) = single_zip_entry(path) {
            debug!(entry = %inner_name, crc = %crc, "using stored CRC of single zip entry");
            return Ok(RomIdentity {
                name: inner_name,
                checksum: Checksum::Known(crc),
                size,
            });
        }
    }

    let crc = crc32_of_file(path)?;
    Ok(RomIdentity {
        name: file_name,
        checksum: Checksum::Known(crc),
        size,
    })
}

/// Path of the checksum sidecar for `path` (`<path>.crc`, extension
/// appended, not substituted).
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".crc");
    PathBuf::from(os)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// Read the name and stored CRC of the sole entry of a zip archive.
///
/// Returns `None` for archives with zero or multiple entries, or when the
/// archive cannot be read at all. The central directory carries per-entry
/// CRCs, so no decompression happens here.
fn single_zip_entry(path: &Path) -> Option<(String, String)> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return None,
    };
    let mut archive = match zip::ZipArchive::new(file) {
        Ok(a) => a,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "not a readable zip archive");
            return None;
        }
    };
    if archive.len() != 1 {
        return None;
    }
    let entry = archive.by_index_raw(0).ok()?;
    Some((entry.name().to_string(), format!("{:08X}", entry.crc32())))
}

/// Stream the whole file through CRC-32, rendered as 8 uppercase hex digits.
fn crc32_of_file(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "computing CRC-32");
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = crc32fast::Hasher::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:08X}", hasher.finalize()))
}
