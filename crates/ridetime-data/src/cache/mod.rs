//! On-disk cache for downloaded trip files.
//!
//! Remote parquet files are large and immutable once published, so a copy is
//! kept under a platform cache directory keyed by source location.

use crate::error::{DataError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the default cache directory path.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/ridetime/`
/// - macOS: `~/Library/Caches/ridetime/`
/// - Windows: `%LOCALAPPDATA%\ridetime\`
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ridetime")
}

/// Directory of cached downloads.
#[derive(Debug, Clone)]
pub struct DownloadCache {
    dir: PathBuf,
}

impl DownloadCache {
    /// Open a cache rooted at `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| DataError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a source would be cached under.
    ///
    /// The key is the URL without scheme, query, or fragment, flattened into a
    /// single file name, so equal file names served from different hosts or
    /// base paths get separate entries.
    pub fn entry_path(&self, url: &str) -> PathBuf {
        let location = url.split(['?', '#']).next().unwrap_or(url);
        let location = location
            .split_once("://")
            .map_or(location, |(_, rest)| rest);

        let name = location
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                segment
                    .chars()
                    .map(|c| {
                        if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                            c
                        } else {
                            '_'
                        }
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("_");

        if name.is_empty() {
            self.dir.join("download")
        } else {
            self.dir.join(name)
        }
    }

    /// Cached bytes for a source, if present.
    pub fn get(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let path = self.entry_path(url);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path).map_err(|e| DataError::io(&path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "cache hit");
        Ok(Some(bytes))
    }

    /// Store downloaded bytes.
    ///
    /// Writes to a temporary sibling first and renames, so readers never see a
    /// partial file.
    pub fn put(&self, url: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.entry_path(url);
        let partial = path.with_extension("partial");
        std::fs::write(&partial, bytes).map_err(|e| DataError::io(&partial, e))?;
        std::fs::rename(&partial, &path).map_err(|e| DataError::io(&path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "cached download");
        Ok(path)
    }

    /// Remove a cached entry. Missing entries are not an error.
    pub fn invalidate(&self, url: &str) -> Result<()> {
        let path = self.entry_path(url);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DataError::io(&path, e)),
        }
    }
}
