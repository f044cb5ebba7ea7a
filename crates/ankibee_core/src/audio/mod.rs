//! Pronunciation audio lookup.
//!
//! [`AudioFetcher`] prefers the on-disk [`AudioCache`](crate::cache::AudioCache)
//! and only goes to the network on a miss. Network attempts are bounded by a
//! per-attempt timeout and retried under a [`RetryPolicy`](crate::net::RetryPolicy).

mod error;
mod fetcher;

pub use error::{AudioError, AudioResult};
pub use fetcher::{cache_key, AudioFetcher, AudioOptions, DEFAULT_AUDIO_BASE_URL, DESKTOP_USER_AGENT};
