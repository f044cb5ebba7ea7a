//! Error types for audio lookups.

use std::time::Duration;

use thiserror::Error;

use crate::cache::CacheError;
use crate::models::Region;
use crate::net::{Retryable, TransportError};

/// Errors raised while fetching pronunciation audio.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Empty word after normalization.
    #[error("Cannot fetch audio for an empty word")]
    EmptyWord,

    /// One attempt exceeded its time budget.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The provider has no clip for this word/region.
    #[error("No pronunciation found for \"{word}\" ({region})")]
    NotFound { word: String, region: String },

    /// Any other non-2xx status.
    #[error("Failed to fetch audio (HTTP {0})")]
    Http(u16),

    /// 2xx with a zero-length body.
    #[error("Received empty audio data from server")]
    EmptyPayload,

    /// No response at all.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Reading or writing the cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl AudioError {
    /// Create a not-found error for `word` in `region`.
    pub fn not_found(word: impl Into<String>, region: Region) -> Self {
        Self::NotFound {
            word: word.into(),
            region: region.code().to_uppercase(),
        }
    }
}

impl Retryable for AudioError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            AudioError::Timeout(_)
                | AudioError::NotFound { .. }
                | AudioError::Http(_)
                | AudioError::EmptyPayload
                | AudioError::Transport(_)
        )
    }

    /// A timed-out attempt already waited its full budget.
    fn should_back_off(&self) -> bool {
        !matches!(self, AudioError::Timeout(_))
    }
}

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;
