//! TTL-keyed JSON store of formatted definitions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use super::error::{DictionaryError, DictionaryResult};
use crate::models::normalize_word;

/// Default time-to-live for cached definitions: 30 days.
pub const DEFAULT_DEFINITION_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// A cached definition and when it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub definition: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl CacheEntry {
    /// Whether the entry is still within `ttl` at `now_ms`.
    pub fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        is_fresh(self.timestamp, now_ms, ttl)
    }
}

/// Normalized word → entry. Ordered so the file diffs cleanly.
pub type DefinitionMap = BTreeMap<String, CacheEntry>;

/// Single-file definition cache.
///
/// The whole map is read and rewritten on every update; a missing or corrupt
/// file reads as an empty cache.
#[derive(Debug, Clone)]
pub struct DefinitionCache {
    path: PathBuf,
    ttl: Duration,
}

impl DefinitionCache {
    /// Create a cache backed by `path`. Does not touch the filesystem.
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    /// Cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Load the map, treating a missing or unparsable file as empty.
    pub async fn load(&self) -> DefinitionMap {
        load_map(&self.path).await
    }

    /// Persist the map atomically (temp file, then rename).
    pub async fn save(&self, map: &DefinitionMap) -> DictionaryResult<()> {
        save_map(&self.path, map).await
    }

    /// The cached definition for `word`, if present and fresh at `now_ms`.
    pub fn lookup(&self, map: &DefinitionMap, word: &str, now_ms: i64) -> Option<String> {
        map.get(&normalize_word(word))
            .filter(|entry| entry.is_fresh(now_ms, self.ttl))
            .map(|entry| entry.definition.clone())
    }

    /// Record `definition` for `word` at `now_ms` and persist the file.
    pub async fn store(&self, word: &str, definition: &str, now_ms: i64) -> DictionaryResult<()> {
        let mut map = self.load().await;
        map.insert(
            normalize_word(word),
            CacheEntry {
                definition: definition.to_string(),
                timestamp: now_ms,
            },
        );
        self.save(&map).await
    }
}

/// Whether something stamped at `timestamp` is still within `ttl` at `now_ms`.
pub(super) fn is_fresh(timestamp: i64, now_ms: i64, ttl: Duration) -> bool {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    now_ms.saturating_sub(timestamp) < ttl_ms
}

/// Read a JSON map file. Missing or corrupt files read as empty.
pub(super) async fn load_map<M>(path: &Path) -> M
where
    M: DeserializeOwned + Default,
{
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            debug!("Cache {} not readable ({}), starting empty", path.display(), e);
            return M::default();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!("Cache {} is corrupt ({}), starting empty", path.display(), e);
        M::default()
    })
}

/// Write a JSON map file via temp file and rename.
pub(super) async fn save_map<M: Serialize>(path: &Path, map: &M) -> DictionaryResult<()> {
    let content =
        serde_json::to_string(map).map_err(|e| DictionaryError::invalid_data(e.to_string()))?;
    atomic_write(path, &content)
        .await
        .map_err(|source| DictionaryError::CacheWrite {
            path: path.to_path_buf(),
            source,
        })
}

async fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content).await?;
    fs::rename(&temp_path, path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let cache = DefinitionCache::new(dir.path().join("none.json"), DEFAULT_DEFINITION_TTL);
        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dictionary-cache.json");
        std::fs::write(&path, "{not json").unwrap();

        let cache = DefinitionCache::new(&path, DEFAULT_DEFINITION_TTL);
        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn store_normalizes_key_and_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dictionary-cache.json");
        let cache = DefinitionCache::new(&path, DEFAULT_DEFINITION_TTL);

        cache.store("  Apple ", "[noun]\nA fruit.", 1_000).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["apple"]["definition"], "[noun]\nA fruit.");
        assert_eq!(raw["apple"]["timestamp"], 1_000);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn lookup_respects_ttl() {
        let dir = tempdir().unwrap();
        let cache = DefinitionCache::new(dir.path().join("c.json"), DEFAULT_DEFINITION_TTL);
        cache.store("apple", "fruit", 0).await.unwrap();
        let map = cache.load().await;

        assert_eq!(cache.lookup(&map, "APPLE", 29 * DAY_MS).as_deref(), Some("fruit"));
        assert_eq!(cache.lookup(&map, "apple", 30 * DAY_MS), None);
        assert_eq!(cache.lookup(&map, "pear", 0), None);
    }
}
