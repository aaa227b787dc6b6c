//! Persistent snapshot store
//!
//! Keeps the last good [`CacheSnapshot`] in a single JSON file. Writes go to a
//! temporary file that is then renamed over the canonical one, so a reader
//! never sees a half-written snapshot.

use directories::ProjectDirs;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

use super::CacheSnapshot;

/// Name of the canonical snapshot file
pub const SNAPSHOT_FILE: &str = "listings_cache.json";

/// Errors from reading or writing the snapshot file
#[derive(Debug, Error)]
pub enum StoreError {
    /// No snapshot has been persisted yet
    #[error("no persisted snapshot at {0}")]
    NotFound(PathBuf),

    /// The file exists but does not hold a valid snapshot
    #[error("persisted snapshot at {path} is corrupt: {source}")]
    CorruptCache {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Reads and writes the snapshot file
///
/// The file lives in an XDG-compliant cache directory (`~/.cache/leasedesk/`
/// on Linux) unless a directory is given explicitly.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    cache_dir: PathBuf,
}

impl SnapshotStore {
    /// Creates a store in the XDG cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "leasedesk")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a store rooted at a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Path to the canonical snapshot file
    pub fn path(&self) -> PathBuf {
        self.cache_dir.join(SNAPSHOT_FILE)
    }

    fn temp_path(&self) -> PathBuf {
        self.path().with_extension("json.tmp")
    }

    /// Persists the snapshot, replacing any previous one
    pub fn save(&self, snapshot: &CacheSnapshot) -> Result<(), StoreError> {
        fs::create_dir_all(&self.cache_dir)?;

        let json = serde_json::to_string_pretty(snapshot).map_err(StoreError::Serialize)?;

        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, self.path())?;

        Ok(())
    }

    /// Reads the persisted snapshot
    pub fn load(&self) -> Result<CacheSnapshot, StoreError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StoreError::NotFound(path)),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|source| StoreError::CorruptCache { path, source })
    }
}
