//! Deck export orchestration.
//!
//! Drives one export through its phases: runtime check, save prompt,
//! validation, media staging, packaging and cleanup.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::errors::ExportError;
use super::packager::{reported_failure, Packager};
use super::prompt::SavePathPrompt;
use super::protocol::{ExportRequest, PackagerResponse};
use super::stager::MediaStager;
use super::types::{ExportPhase, ExportResult, PhaseCallback};
use crate::models::Card;

/// Extension of the deck files produced by the packager.
pub const DECK_EXTENSION: &str = "apkg";

/// Builds `.apkg` decks from cards via the external packager.
///
/// Exports sharing a staging directory must not run concurrently.
pub struct DeckExporter {
    packager: Packager,
    stager: MediaStager,
    downloads_dir: PathBuf,
    on_phase: Option<PhaseCallback>,
}

impl DeckExporter {
    /// Create an exporter. `downloads_dir` seeds the suggested output path.
    pub fn new(packager: Packager, stager: MediaStager, downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            packager,
            stager,
            downloads_dir: downloads_dir.into(),
            on_phase: None,
        }
    }

    /// Observe phase transitions.
    pub fn with_phase_callback(mut self, callback: PhaseCallback) -> Self {
        self.on_phase = Some(callback);
        self
    }

    /// Staging used by this exporter.
    pub fn stager(&self) -> &MediaStager {
        &self.stager
    }

    /// Path suggested to the save prompt for `deck_name`.
    pub fn default_output_path(&self, deck_name: &str) -> PathBuf {
        let stem: String = deck_name
            .trim()
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
            .collect();
        self.downloads_dir.join(format!("{}.{}", stem, DECK_EXTENSION))
    }

    /// Export `cards` as a deck named `deck_name`.
    ///
    /// The caller's cards are never modified; staging works on copies of the
    /// cards that pass validation.
    pub async fn export_deck(
        &self,
        deck_name: &str,
        cards: &[Card],
        prompt: &dyn SavePathPrompt,
    ) -> Result<ExportResult, ExportError> {
        info!("Exporting deck '{}' ({} cards)", deck_name, cards.len());

        self.enter(ExportPhase::VerifyingRuntime);
        if let Err(e) = self.packager.verify_runtime().await {
            return Err(self.fail(e));
        }

        self.enter(ExportPhase::AwaitingPath);
        let suggested = self.default_output_path(deck_name);
        let Some(output_path) = prompt.choose_output_path(&suggested).await else {
            info!("Export cancelled at save prompt");
            return Err(self.fail(ExportError::Cancelled));
        };

        self.enter(ExportPhase::Validating);
        let mut valid: Vec<Card> = cards.iter().filter(|c| c.is_exportable()).cloned().collect();
        let skipped = cards.len() - valid.len();
        if skipped > 0 {
            warn!("Skipping {} card(s) missing a word, definition, or audio", skipped);
        }
        if valid.is_empty() {
            return Err(self.fail(ExportError::NoValidCards));
        }

        self.enter(ExportPhase::Staging);
        let staged = match self.stager.prepare_media_files(&mut valid).await {
            Ok(staged) => staged,
            Err(e) => return Err(self.fail(e.into())),
        };
        if staged.is_empty() {
            return Err(self.fail(ExportError::NoMediaStaged));
        }

        let outcome = self.package(deck_name, &valid, &staged, &output_path).await;

        self.enter(ExportPhase::Cleanup);
        let removed = self.stager.cleanup(&staged).await;
        if removed < staged.len() {
            warn!("Removed {} of {} staged files", removed, staged.len());
        }

        let response = match outcome {
            Ok(response) => response,
            Err(e) => return Err(self.fail(e)),
        };
        if !response.success {
            return Err(self.fail(ExportError::PackagerReported(reported_failure(&response))));
        }

        if let Some(reported) = response.output_path.filter(|p| *p != output_path) {
            warn!(
                "Packager reported {} instead of {}",
                reported.display(),
                output_path.display()
            );
        }
        self.enter(ExportPhase::Succeeded);
        info!("Deck written to {}", output_path.display());
        Ok(ExportResult {
            success: true,
            file_path: output_path,
        })
    }

    async fn package(
        &self,
        deck_name: &str,
        cards: &[Card],
        staged: &[PathBuf],
        output_path: &Path,
    ) -> Result<PackagerResponse, ExportError> {
        let request = ExportRequest::new(deck_name, cards, staged.to_vec(), output_path.to_path_buf())?;

        self.enter(ExportPhase::Spawning);
        let running = self.packager.spawn(&request)?;
        self.enter(ExportPhase::Running);
        running.wait().await
    }

    fn enter(&self, phase: ExportPhase) {
        info!("Export phase: {}", phase);
        if let Some(callback) = &self.on_phase {
            callback(phase);
        }
    }

    fn fail(&self, err: ExportError) -> ExportError {
        error!("Export failed: {}", err);
        self.enter(ExportPhase::Failed);
        err
    }
}
