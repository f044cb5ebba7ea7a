//! Cache-first audio fetcher with retry and timeout.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::error::{AudioError, AudioResult};
use crate::cache::AudioCache;
use crate::models::{normalize_word, Region};
use crate::net::{encode_path_segment, retry_async, HttpFetch, RetryPolicy};

/// Default pronunciation provider.
pub const DEFAULT_AUDIO_BASE_URL: &str = "https://ssl.gstatic.com/dictionary/static/sounds/oxford";

/// The provider rejects requests without a browser-like agent.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Tunables for [`AudioFetcher`].
#[derive(Debug, Clone)]
pub struct AudioOptions {
    pub base_url: String,
    pub user_agent: String,
    /// Hard bound on a single attempt.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for AudioOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AUDIO_BASE_URL.to_string(),
            user_agent: DESKTOP_USER_AGENT.to_string(),
            timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
        }
    }
}

/// Cache key for a word/region pair: `normalize(word)-region`.
///
/// Path separators and `..` in the word become `_` so every word maps to a
/// file inside the cache directory ("AC/DC" → `ac_dc-us`).
pub fn cache_key(word: &str, region: Region) -> String {
    let stem: String = normalize_word(word)
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    format!("{}-{}", stem.replace("..", "__"), region.code())
}

/// Obtains pronunciation clips, preferring the cache.
///
/// Concurrent fetches of the same key are not coordinated; both may hit the
/// network and both write identical bytes to the same cache file.
pub struct AudioFetcher {
    http: Arc<dyn HttpFetch>,
    cache: AudioCache,
    options: AudioOptions,
}

impl AudioFetcher {
    /// Create a fetcher over the given transport and cache.
    pub fn new(http: Arc<dyn HttpFetch>, cache: AudioCache, options: AudioOptions) -> Self {
        Self {
            http,
            cache,
            options,
        }
    }

    /// The cache this fetcher reads from and writes to.
    pub fn cache(&self) -> &AudioCache {
        &self.cache
    }

    /// Provider URL for an already-normalized word.
    pub fn url_for(&self, normalized_word: &str, region: Region) -> String {
        format!(
            "{}/{}--_{}_1.mp3",
            self.options.base_url.trim_end_matches('/'),
            encode_path_segment(normalized_word),
            region.code()
        )
    }

    /// Fetch the clip for `word` in `region`.
    ///
    /// A cache hit returns immediately without network traffic. On a miss the
    /// first non-empty 2xx body is cached and returned; a failed fetch leaves
    /// the cache untouched.
    pub async fn fetch_audio(&self, word: &str, region: Region) -> AudioResult<Vec<u8>> {
        let normalized = normalize_word(word);
        if normalized.is_empty() {
            return Err(AudioError::EmptyWord);
        }
        let key = cache_key(&normalized, region);

        if self.cache.check_exists(&key).await {
            debug!("Found audio in cache: {}", key);
            return Ok(self.cache.read(&key).await?);
        }

        let url = self.url_for(&normalized, region);
        info!("Fetching audio from: {}", url);

        let bytes = retry_async(&self.options.retry, |attempt| {
            let url = url.as_str();
            let normalized = normalized.as_str();
            async move {
                debug!("Audio attempt {} for {}", attempt, normalized);
                self.attempt(url, normalized, region).await
            }
        })
        .await?;

        info!("Saving audio to cache: {} ({} bytes)", key, bytes.len());
        self.cache.save(&key, &bytes).await?;
        Ok(bytes)
    }

    async fn attempt(&self, url: &str, word: &str, region: Region) -> AudioResult<Vec<u8>> {
        let headers = [("User-Agent", self.options.user_agent.as_str())];
        let response = tokio::time::timeout(self.options.timeout, self.http.get(url, &headers))
            .await
            .map_err(|_| AudioError::Timeout(self.options.timeout))??;

        match response.status {
            404 => Err(AudioError::not_found(word, region)),
            _ if !response.is_success() => Err(AudioError::Http(response.status)),
            _ if response.body.is_empty() => Err(AudioError::EmptyPayload),
            _ => Ok(response.body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, ScriptedFetch};
    use tempfile::tempdir;

    fn fetcher(http: Arc<ScriptedFetch>, cache: AudioCache) -> AudioFetcher {
        AudioFetcher::new(http, cache, AudioOptions::default())
    }

    #[test]
    fn key_and_url_are_normalized() {
        let fetcher = fetcher(
            Arc::new(ScriptedFetch::offline()),
            AudioCache::new("/unused"),
        );
        assert_eq!(cache_key("  Hello ", Region::Us), "hello-us");
        assert_eq!(
            fetcher.url_for("ice cream", Region::Gb),
            format!("{}/ice%20cream--_gb_1.mp3", DEFAULT_AUDIO_BASE_URL)
        );
    }

    #[tokio::test]
    async fn cache_hit_makes_no_network_call() {
        let dir = tempdir().unwrap();
        let cache = AudioCache::new(dir.path());
        cache.save("hello-us", b"cached clip").await.unwrap();

        let http = Arc::new(ScriptedFetch::offline());
        let bytes = fetcher(http.clone(), cache)
            .fetch_audio("hello", Region::Us)
            .await
            .unwrap();

        assert_eq!(bytes, b"cached clip");
        assert_eq!(http.calls(), 0);
    }

    #[tokio::test]
    async fn miss_fetches_once_and_caches() {
        let dir = tempdir().unwrap();
        let cache = AudioCache::new(dir.path());
        let http = Arc::new(ScriptedFetch::new([Reply::ok(b"mp3 bytes".to_vec())]));
        let fetcher = fetcher(http.clone(), cache.clone());

        let bytes = fetcher.fetch_audio(" World", Region::Gb).await.unwrap();

        assert_eq!(bytes, b"mp3 bytes");
        assert_eq!(http.calls(), 1);
        assert_eq!(
            http.header(0, "user-agent").as_deref(),
            Some(DESKTOP_USER_AGENT)
        );
        assert_eq!(cache.read("world-gb").await.unwrap(), b"mp3 bytes");

        // Second call is served from disk.
        fetcher.fetch_audio("world", Region::Gb).await.unwrap();
        assert_eq!(http.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_timeouts_give_up_after_three_attempts() {
        let dir = tempdir().unwrap();
        let cache = AudioCache::new(dir.path());
        let http = Arc::new(ScriptedFetch::new([Reply::Hang]));
        let start = tokio::time::Instant::now();

        let err = fetcher(http.clone(), cache.clone())
            .fetch_audio("slow", Region::Us)
            .await
            .unwrap_err();

        assert!(matches!(err, AudioError::Timeout(_)));
        assert_eq!(err.to_string(), "Request timed out after 5s");
        assert_eq!(http.calls(), 3);
        // Three 5s attempts, retried immediately after each timeout.
        assert_eq!(start.elapsed(), Duration::from_secs(15));
        assert!(!cache.check_exists("slow-us").await);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_from_transient_failures() {
        let dir = tempdir().unwrap();
        let http = Arc::new(ScriptedFetch::new([
            Reply::status(503),
            Reply::ok(Vec::new()),
            Reply::ok(b"third time".to_vec()),
        ]));

        let bytes = fetcher(http.clone(), AudioCache::new(dir.path()))
            .fetch_audio("retry", Region::Us)
            .await
            .unwrap();

        assert_eq!(bytes, b"third time");
        assert_eq!(http.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_is_retried_with_backoff() {
        let dir = tempdir().unwrap();
        let cache = AudioCache::new(dir.path());
        let http = Arc::new(ScriptedFetch::new([Reply::status(404)]));
        let start = tokio::time::Instant::now();

        let err = fetcher(http.clone(), cache.clone())
            .fetch_audio("Zzxq", Region::Gb)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "No pronunciation found for \"zzxq\" (GB)");
        assert_eq!(http.calls(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
        assert!(!cache.check_exists("zzxq-gb").await);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_is_retried_then_recovers() {
        let dir = tempdir().unwrap();
        let cache = AudioCache::new(dir.path());
        let http = Arc::new(ScriptedFetch::new([
            Reply::Broken("connection reset"),
            Reply::ok(b"clip".to_vec()),
        ]));

        let bytes = fetcher(http.clone(), cache.clone())
            .fetch_audio("reset", Region::Us)
            .await
            .unwrap();

        assert_eq!(bytes, b"clip");
        assert_eq!(http.calls(), 2);
        assert!(cache.check_exists("reset-us").await);
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_transport_errors_surface_after_three_attempts() {
        let dir = tempdir().unwrap();
        let cache = AudioCache::new(dir.path());
        let http = Arc::new(ScriptedFetch::new([Reply::Broken("dns failure")]));

        let err = fetcher(http.clone(), cache.clone())
            .fetch_audio("offline", Region::Gb)
            .await
            .unwrap_err();

        assert!(matches!(err, AudioError::Transport(ref e) if e.message == "dns failure"));
        assert_eq!(http.calls(), 3);
        assert!(!cache.check_exists("offline-gb").await);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_http_errors_report_last_status() {
        let dir = tempdir().unwrap();
        let http = Arc::new(ScriptedFetch::new([
            Reply::status(500),
            Reply::status(502),
            Reply::status(503),
        ]));

        let err = fetcher(http.clone(), AudioCache::new(dir.path()))
            .fetch_audio("flaky", Region::Us)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to fetch audio (HTTP 503)");
        assert_eq!(http.calls(), 3);
    }

    #[tokio::test]
    async fn word_with_separator_is_fetched_and_cached() {
        let dir = tempdir().unwrap();
        let cache = AudioCache::new(dir.path());
        let http = Arc::new(ScriptedFetch::new([Reply::ok(b"rock".to_vec())]));

        let bytes = fetcher(http.clone(), cache.clone())
            .fetch_audio("AC/DC", Region::Us)
            .await
            .unwrap();

        assert_eq!(bytes, b"rock");
        assert!(http.urls()[0].ends_with("/ac%2Fdc--_us_1.mp3"));
        assert_eq!(cache_key("AC/DC", Region::Us), "ac_dc-us");
        assert!(cache.check_exists("ac_dc-us").await);
        assert_eq!(cache_key("..\\x", Region::Gb), "___x-gb");
    }

    #[tokio::test]
    async fn empty_word_is_rejected() {
        let http = Arc::new(ScriptedFetch::offline());
        let err = fetcher(http, AudioCache::new("/unused"))
            .fetch_audio("   ", Region::Us)
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::EmptyWord));
    }
}
