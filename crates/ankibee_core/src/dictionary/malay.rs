//! Malay definitions from the DBP online dictionary.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::cache::{is_fresh, load_map, save_map};
use super::dbp::{parse_dbp_page, DbpResult};
use super::error::{DictionaryError, DictionaryResult};
use crate::models::normalize_word;
use crate::net::{encode_path_segment, HttpFetch, TransportError};

/// Default DBP search endpoint; the word goes in the `keyword` parameter.
pub const DEFAULT_MALAY_DICTIONARY_BASE_URL: &str = "https://prpm.dbp.gov.my/Cari1";

/// Bound on one DBP request. The site is slow.
pub const MALAY_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// A cached search result and when it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalayCacheEntry {
    pub result: DbpResult,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Normalized word → entry.
pub type MalayMap = BTreeMap<String, MalayCacheEntry>;

/// Single-file cache of DBP search results.
#[derive(Debug, Clone)]
pub struct MalayCache {
    path: PathBuf,
    ttl: Duration,
}

impl MalayCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the map, treating a missing or unparsable file as empty.
    pub async fn load(&self) -> MalayMap {
        load_map(&self.path).await
    }

    pub async fn save(&self, map: &MalayMap) -> DictionaryResult<()> {
        save_map(&self.path, map).await
    }

    /// The cached result for `word`, if present and fresh at `now_ms`.
    pub fn lookup(&self, map: &MalayMap, word: &str, now_ms: i64) -> Option<DbpResult> {
        map.get(&normalize_word(word))
            .filter(|entry| is_fresh(entry.timestamp, now_ms, self.ttl))
            .map(|entry| entry.result.clone())
    }

    /// Record `result` for `word` at `now_ms` and persist the file.
    pub async fn store(&self, word: &str, result: &DbpResult, now_ms: i64) -> DictionaryResult<()> {
        let mut map = self.load().await;
        map.insert(
            normalize_word(word),
            MalayCacheEntry {
                result: result.clone(),
                timestamp: now_ms,
            },
        );
        self.save(&map).await
    }
}

/// Looks words up on DBP, preferring the cache.
pub struct MalayDictionaryClient {
    http: Arc<dyn HttpFetch>,
    cache: MalayCache,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

impl MalayDictionaryClient {
    pub fn new(
        http: Arc<dyn HttpFetch>,
        cache: MalayCache,
        base_url: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            http,
            cache,
            base_url: base_url.into(),
            user_agent: user_agent.into(),
            timeout: MALAY_REQUEST_TIMEOUT,
        }
    }

    pub fn cache(&self) -> &MalayCache {
        &self.cache
    }

    /// Search DBP for `word`.
    ///
    /// A 404 is an empty result and is not cached. Other non-2xx statuses,
    /// timeouts and transport failures are errors; nothing is retried.
    pub async fn search(&self, word: &str) -> DictionaryResult<DbpResult> {
        let normalized = normalize_word(word);
        if normalized.is_empty() {
            return Err(DictionaryError::EmptyWord);
        }

        let map = self.cache.load().await;
        if let Some(result) = self.cache.lookup(&map, &normalized, chrono::Utc::now().timestamp_millis()) {
            debug!("Malay dictionary cache hit: {}", normalized);
            return Ok(result);
        }

        let url = format!(
            "{}?keyword={}",
            self.base_url.trim_end_matches('/'),
            encode_path_segment(&normalized)
        );
        info!("Searching Malay word: {}", url);

        let headers = [
            ("User-Agent", self.user_agent.as_str()),
            ("Accept", HTML_ACCEPT),
            ("Accept-Language", "en-US,en;q=0.5"),
        ];
        let response = match tokio::time::timeout(self.timeout, self.http.get(&url, &headers)).await {
            Ok(response) => response?,
            Err(_) => {
                warn!("Malay dictionary request timed out after {:?}", self.timeout);
                return Err(TransportError {
                    url,
                    message: format!("timed out after {}s", self.timeout.as_secs()),
                }
                .into());
            }
        };

        match response.status {
            404 => return Ok(DbpResult::empty(normalized)),
            status if !response.is_success() => return Err(DictionaryError::MalayHttp(status)),
            _ => {}
        }

        let page = String::from_utf8_lossy(&response.body);
        let result = parse_dbp_page(&page, &normalized);
        debug!("DBP returned {} definition(s) for {}", result.definitions.len(), normalized);

        self.cache
            .store(&normalized, &result, chrono::Utc::now().timestamp_millis())
            .await?;
        Ok(result)
    }
}
