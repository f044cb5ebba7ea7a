//! Cache-first dictionary client.

use std::sync::Arc;

use tracing::{debug, info};

use super::cache::DefinitionCache;
use super::error::{DictionaryError, DictionaryResult};
use super::format::{format_definition, DictionaryEntry};
use crate::models::normalize_word;
use crate::net::{encode_path_segment, HttpFetch};

/// Default dictionary endpoint.
pub const DEFAULT_DICTIONARY_BASE_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

/// Resolves formatted definitions, preferring the cache.
pub struct DictionaryClient {
    http: Arc<dyn HttpFetch>,
    cache: DefinitionCache,
    base_url: String,
}

impl DictionaryClient {
    /// Create a client over the given transport and cache.
    pub fn new(http: Arc<dyn HttpFetch>, cache: DefinitionCache, base_url: impl Into<String>) -> Self {
        Self {
            http,
            cache,
            base_url: base_url.into(),
        }
    }

    /// The cache this client reads from and writes to.
    pub fn cache(&self) -> &DefinitionCache {
        &self.cache
    }

    /// Fetch the formatted definition for `word`.
    ///
    /// Within the TTL window repeated calls return the cached string without
    /// touching the network. HTTP failures are not retried.
    pub async fn fetch_definition(&self, word: &str) -> DictionaryResult<String> {
        let normalized = normalize_word(word);
        if normalized.is_empty() {
            return Err(DictionaryError::EmptyWord);
        }

        let now = chrono::Utc::now().timestamp_millis();
        let map = self.cache.load().await;
        if let Some(definition) = self.cache.lookup(&map, &normalized, now) {
            debug!("Definition cache hit: {}", normalized);
            return Ok(definition);
        }

        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            encode_path_segment(&normalized)
        );
        info!("Fetching definition from: {}", url);

        let response = self.http.get(&url, &[("Accept", "application/json")]).await?;
        match response.status {
            404 => return Err(DictionaryError::NotFound(normalized)),
            status if !response.is_success() => return Err(DictionaryError::Http(status)),
            _ => {}
        }

        let entries: Vec<DictionaryEntry> = serde_json::from_slice(&response.body)
            .map_err(|e| DictionaryError::invalid_data(e.to_string()))?;
        let definition = format_definition(&entries)?;

        self.cache
            .store(&normalized, &definition, chrono::Utc::now().timestamp_millis())
            .await?;

        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{CacheEntry, DefinitionMap, DEFAULT_DEFINITION_TTL};
    use crate::testing::{Reply, ScriptedFetch};
    use tempfile::{tempdir, TempDir};

    const QUIXOTIC: &str = r#"[{"word": "quixotic", "phonetic": "/kwɪkˈsɒtɪk/", "meanings": [
        {"partOfSpeech": "adjective",
         "definitions": [{"definition": "Extremely idealistic; unrealistic."}]}
    ]}]"#;

    fn make_client(http: Arc<ScriptedFetch>) -> (DictionaryClient, TempDir) {
        let dir = tempdir().unwrap();
        let cache = DefinitionCache::new(dir.path().join("dictionary-cache.json"), DEFAULT_DEFINITION_TTL);
        (DictionaryClient::new(http, cache, DEFAULT_DICTIONARY_BASE_URL), dir)
    }

    #[tokio::test]
    async fn cold_cache_fetches_formats_and_caches() {
        let http = Arc::new(ScriptedFetch::new([Reply::ok(QUIXOTIC)]));
        let (client, _dir) = make_client(http.clone());

        let definition = client.fetch_definition("Quixotic").await.unwrap();

        assert_eq!(
            definition,
            "/kwɪkˈsɒtɪk/\n\n[adjective]\nExtremely idealistic; unrealistic."
        );
        assert_eq!(
            http.urls(),
            vec![format!("{}/quixotic", DEFAULT_DICTIONARY_BASE_URL)]
        );
        let map = client.cache().load().await;
        assert_eq!(map["quixotic"].definition, definition);
    }

    #[tokio::test]
    async fn second_call_within_ttl_is_identical_and_offline() {
        let http = Arc::new(ScriptedFetch::new([Reply::ok(QUIXOTIC)]));
        let (client, _dir) = make_client(http.clone());

        let first = client.fetch_definition("quixotic").await.unwrap();
        let second = client.fetch_definition(" QUIXOTIC ").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(http.calls(), 1);
    }

    #[tokio::test]
    async fn stale_entry_is_refreshed() {
        let http = Arc::new(ScriptedFetch::new([Reply::ok(QUIXOTIC)]));
        let (client, _dir) = make_client(http.clone());

        let mut map = DefinitionMap::new();
        map.insert(
            "quixotic".to_string(),
            CacheEntry {
                definition: "stale".to_string(),
                timestamp: 0,
            },
        );
        client.cache().save(&map).await.unwrap();

        let definition = client.fetch_definition("quixotic").await.unwrap();
        assert_ne!(definition, "stale");
        assert_eq!(http.calls(), 1);
        assert!(client.cache().load().await["quixotic"].timestamp > 0);
    }

    #[tokio::test]
    async fn not_found_and_http_errors_are_terminal() {
        let http = Arc::new(ScriptedFetch::new([Reply::status(404)]));
        let (client, _dir) = make_client(http.clone());
        let err = client.fetch_definition("Zzxq").await.unwrap_err();
        assert_eq!(err.to_string(), "Word \"zzxq\" not found in dictionary");
        assert_eq!(http.calls(), 1);

        let http = Arc::new(ScriptedFetch::new([Reply::status(500)]));
        let (client, _dir) = make_client(http.clone());
        let err = client.fetch_definition("apple").await.unwrap_err();
        assert!(matches!(err, DictionaryError::Http(500)));
        assert_eq!(http.calls(), 1);
        assert!(client.cache().load().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_data() {
        let http = Arc::new(ScriptedFetch::new([Reply::ok("[]")]));
        let (client, _dir) = make_client(http);
        let err = client.fetch_definition("apple").await.unwrap_err();
        assert!(matches!(err, DictionaryError::InvalidData(_)));
    }
}
