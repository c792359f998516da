//! File cache store for persisting rate snapshots to disk
//!
//! Provides a `CacheStore` that stores serializable data as JSON files in a flat
//! directory, replacing entries with a write-then-rename so readers never see a
//! partially written file.

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while reading or writing the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// No entry exists under the requested key
    #[error("No cache entry for key '{0}'")]
    NotFound(String),

    /// Filesystem operation failed
    #[error("Cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Entry could not be encoded or decoded as JSON
    #[error("Cache entry is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    fn io(path: &Path, source: io::Error) -> Self {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reads, writes and deletes JSON cache entries under a single root directory
///
/// The store uses an XDG-compliant cache directory (`~/.cache/ratecache/` on
/// Linux) unless constructed with an explicit root. Each key maps to
/// `{root}/{key}.json`.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory where cache files are stored
    root: PathBuf,
}

impl CacheStore {
    /// Creates a new CacheStore using the platform cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "ratecache")?;
        let root = project_dirs.cache_dir().to_path_buf();
        Some(Self { root })
    }

    /// Creates a new CacheStore rooted at a custom directory
    pub fn with_dir(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of the cache file for the given key
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Reports whether the cache root directory exists
    pub fn exists_root(&self) -> bool {
        self.root.is_dir()
    }

    /// Creates the cache root directory, including missing parents
    ///
    /// Calling this when the root already exists is a no-op.
    pub fn create_root(&self) -> Result<(), CacheError> {
        fs::create_dir_all(&self.root).map_err(|e| CacheError::io(&self.root, e))
    }

    /// Writes data to the cache under `key`, replacing any existing entry
    ///
    /// The JSON is first written to a uniquely named temporary file beside the
    /// target and then renamed over it. Concurrent writers to the same key each
    /// get their own temporary file; the last rename wins.
    ///
    /// # Arguments
    /// * `key` - Unique identifier for the cache entry (e.g., "EUR-USD")
    /// * `data` - The data to cache (must implement Serialize)
    pub fn write<T: Serialize>(&self, key: &str, data: &T) -> Result<(), CacheError> {
        if !self.exists_root() {
            self.create_root()?;
        }

        let json = serde_json::to_string_pretty(data)?;

        let target = self.path_for(key);
        let mut staging =
            NamedTempFile::new_in(&self.root).map_err(|e| CacheError::io(&self.root, e))?;
        staging
            .write_all(json.as_bytes())
            .map_err(|e| CacheError::io(staging.path(), e))?;
        staging
            .persist(&target)
            .map_err(|e| CacheError::io(&target, e.error))?;

        debug!(key, path = %target.display(), "cache entry written");
        Ok(())
    }

    /// Reads data from the cache
    ///
    /// # Returns
    /// * `Ok(T)` if the entry exists and can be parsed
    /// * `Err(CacheError::NotFound)` if there is no entry for `key`
    /// * `Err(CacheError::Serialization)` if the file is not valid JSON for `T`
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        let path = self.path_for(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CacheError::NotFound(key.to_string()))
            }
            Err(e) => return Err(CacheError::io(&path, e)),
        };

        Ok(serde_json::from_str(&content)?)
    }

    /// Deletes the entry stored under `key`
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "cache entry deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(CacheError::NotFound(key.to_string()))
            }
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }
}
