//! Interactive save-path prompt.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dialoguer::{theme::ColorfulTheme, Input};
use tracing::warn;

use ankibee_core::export::SavePathPrompt;

/// Asks on the terminal, pre-filled with the suggested path.
///
/// Clearing the answer cancels the export.
pub struct DialoguerPrompt;

#[async_trait]
impl SavePathPrompt for DialoguerPrompt {
    async fn choose_output_path(&self, suggested: &Path) -> Option<PathBuf> {
        let initial = suggested.display().to_string();
        let answer = tokio::task::spawn_blocking(move || {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt("Save deck to (clear to cancel)")
                .with_initial_text(initial)
                .allow_empty(true)
                .interact_text()
        })
        .await;

        match answer {
            Ok(Ok(path)) => parse_answer(&path),
            Ok(Err(e)) => {
                warn!("Save prompt failed: {}", e);
                None
            }
            Err(e) => {
                warn!("Save prompt task failed: {}", e);
                None
            }
        }
    }
}

/// Blank answers cancel.
fn parse_answer(answer: &str) -> Option<PathBuf> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}
