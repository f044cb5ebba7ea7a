//! Content-addressed audio clip store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tracing::debug;

use super::dir::{purge_dir, validate_key, PurgeReport};
use super::error::{CacheError, CacheResult};

/// Extension used for every cached clip.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Durable, idempotent byte storage for audio clips.
///
/// The directory is created lazily and re-verified before every write, so a
/// cache can be constructed before its directory exists and survives the
/// directory being removed underneath it.
#[derive(Debug, Clone)]
pub struct AudioCache {
    dir: PathBuf,
}

impl AudioCache {
    /// Create a cache rooted at `dir`. Does not touch the filesystem.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Canonical path for `key`. The file may not exist.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, AUDIO_EXTENSION))
    }

    /// Whether a clip is stored under `key`. No side effects.
    pub async fn check_exists(&self, key: &str) -> bool {
        if validate_key(key).is_err() {
            return false;
        }
        fs::try_exists(self.path_for(key)).await.unwrap_or(false)
    }

    /// Read the clip stored under `key`.
    pub async fn read(&self, key: &str) -> CacheResult<Vec<u8>> {
        validate_key(key)?;
        let path = self.path_for(key);
        fs::read(&path)
            .await
            .map_err(|e| CacheError::io("reading", path, e))
    }

    /// Store `bytes` under `key`, overwriting any previous clip.
    ///
    /// Returns the path written.
    pub async fn save(&self, key: &str, bytes: &[u8]) -> CacheResult<PathBuf> {
        validate_key(key)?;
        self.ensure_dir().await?;

        let path = self.path_for(key);
        fs::write(&path, bytes)
            .await
            .map_err(|e| CacheError::io("writing", &path, e))?;

        debug!("Cached {} bytes of audio at {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Delete every file whose modification time is older than `max_age`.
    ///
    /// Best-effort: failures are logged and counted, never returned.
    pub async fn purge_older_than(&self, max_age: Duration) -> PurgeReport {
        purge_dir(&self.dir, max_age).await
    }

    async fn ensure_dir(&self) -> CacheResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CacheError::io("creating", &self.dir, e))
    }
}
