//! On-disk cache of raw service responses.
//!
//! Layout: `<root>/<systemId>/<fileName>.xml` for per-game responses and
//! `<root>/<fixed name>.xml` for the systems list. Entries are written
//! whole-file via a temp file renamed into place, so readers never observe
//! a partial entry. Nothing here invalidates automatically; callers bypass
//! the cache with an explicit force-refresh flag instead.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// Filesystem cache of raw XML responses keyed by system and file name.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    root: PathBuf,
}

impl ResponseCache {
    /// Create a cache rooted at `root`. The directory is created lazily on
    /// first write.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache path for a per-game response.
    pub fn game_path(&self, system_id: &str, file_name: &str) -> PathBuf {
        self.root.join(system_id).join(format!("{file_name}.xml"))
    }

    /// Cache path for the systems-list response.
    pub fn systems_path(&self) -> PathBuf {
        self.root.join(crate::scraper::SYSTEMS_CACHE_FILE)
    }

    /// Read a cached entry, or `None` when the key has never been written.
    pub fn read(&self, path: &Path) -> Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        debug!(path = %path.display(), "cache hit");
        Ok(Some(std::fs::read_to_string(path)?))
    }

    /// Write an entry, creating intermediate directories as needed.
    ///
    /// The write is whole-file atomic from the reader's perspective: the
    /// body lands in a temp file in the target directory first and is then
    /// renamed over the final path.
    pub fn write(&self, path: &Path, body: &str) -> Result<()> {
        let dir = path.parent().unwrap_or(&self.root);
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(body.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;

        debug!(path = %path.display(), "cache write");
        Ok(())
    }
}
