//! Error types for definition lookups.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::net::TransportError;

/// Errors raised while resolving a definition.
#[derive(Error, Debug)]
pub enum DictionaryError {
    /// Empty word after normalization.
    #[error("Cannot look up an empty word")]
    EmptyWord,

    /// The dictionary has no entry for the word.
    #[error("Word \"{0}\" not found in dictionary")]
    NotFound(String),

    /// Any other non-2xx status.
    #[error("Failed to fetch definition (HTTP {0})")]
    Http(u16),

    /// Non-2xx other than 404 from the Malay dictionary.
    #[error("Failed to fetch Malay definitions (HTTP {0})")]
    MalayHttp(u16),

    /// Response body did not have the expected shape.
    #[error("Invalid definition data: {0}")]
    InvalidData(String),

    /// No response at all.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Persisting the cache file failed.
    #[error("Failed to write dictionary cache {path}: {source}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DictionaryError {
    /// Create an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }
}

/// Result type for dictionary operations.
pub type DictionaryResult<T> = Result<T, DictionaryError>;
