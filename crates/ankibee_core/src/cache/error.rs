//! Error types for cache operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the audio cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key would escape the cache directory or is empty.
    #[error("Invalid cache key '{0}'")]
    InvalidKey(String),

    /// File I/O error with context.
    #[error("Cache I/O error while {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CacheError {
    /// Create an I/O error with context.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
