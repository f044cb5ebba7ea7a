//! Save-path selection seam.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Asks the user where to write the deck.
///
/// Returning `None` cancels the export.
#[async_trait]
pub trait SavePathPrompt: Send + Sync {
    async fn choose_output_path(&self, suggested: &Path) -> Option<PathBuf>;
}

/// Non-interactive prompt with a preset answer.
#[derive(Debug, Clone, Default)]
pub struct FixedPath(pub Option<PathBuf>);

impl FixedPath {
    /// Always answer `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(Some(path.into()))
    }

    /// Always cancel.
    pub fn cancel() -> Self {
        Self(None)
    }
}

#[async_trait]
impl SavePathPrompt for FixedPath {
    async fn choose_output_path(&self, _suggested: &Path) -> Option<PathBuf> {
        self.0.clone()
    }
}
