//! Error types for staging and export.
//!
//! Every variant renders a message fit to show the user as-is.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while materializing card audio into the staging directory.
#[derive(Error, Debug)]
pub enum StageError {
    /// The staging directory could not be created.
    #[error("Failed to create staging directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Copying or writing one card's audio failed.
    #[error("Failed to prepare audio for {word}: {source}")]
    Card {
        word: String,
        #[source]
        source: io::Error,
    },
}

/// Terminal failure of an export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The packaging runtime or its library is missing.
    #[error("Packaging runtime is not ready ({detail}). {hint}")]
    MissingRuntimeDependency { detail: String, hint: String },

    /// The user dismissed the save prompt.
    #[error("Export cancelled by user")]
    Cancelled,

    /// Nothing survived validation.
    #[error("No valid cards to export. Each card must have a word, definition, and audio.")]
    NoValidCards,

    /// Validation passed but staging produced no files.
    #[error("Failed to prepare audio files for export")]
    NoMediaStaged,

    /// Staging failed.
    #[error(transparent)]
    Stage(#[from] StageError),

    /// The request violates the wire contract.
    #[error("Invalid export request: {0}")]
    InvalidRequest(String),

    /// The packager process could not be started.
    #[error("Failed to start packager '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Talking to a running packager failed.
    #[error("Packager I/O failed while {operation}: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// The packager exited 0 but its stdout was not a valid response.
    #[error("Failed to parse packager output: {message}")]
    MalformedOutput { message: String },

    /// The packager exited unsuccessfully or said nothing.
    #[error("Deck packaging failed ({status}): {message}")]
    Subprocess { status: String, message: String },

    /// The packager ran but reported `success: false`.
    #[error("{0}")]
    PackagerReported(String),
}

impl ExportError {
    /// Create a missing runtime dependency error.
    pub fn missing_runtime(detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRuntimeDependency {
            detail: detail.into(),
            hint: hint.into(),
        }
    }

    /// Create a subprocess failure error.
    pub fn subprocess(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Subprocess {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io(operation: &'static str, source: io::Error) -> Self {
        Self::Io { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_error_names_the_word() {
        let err = StageError::Card {
            word: "apple".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("apple"));
    }

    #[test]
    fn no_valid_cards_message() {
        assert!(ExportError::NoValidCards
            .to_string()
            .starts_with("No valid cards to export"));
    }
}
