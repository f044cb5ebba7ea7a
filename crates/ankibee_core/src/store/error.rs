use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::cache::CacheError;

/// Errors from saving or loading the deck file.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed {operation} deck file {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Deck file {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize deck: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to cache card media: {0}")]
    Cache(#[from] CacheError),
}

impl StoreError {
    /// Create an I/O error with context.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Result type for deck store operations.
pub type StoreResult<T> = Result<T, StoreError>;
