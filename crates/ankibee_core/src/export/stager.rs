//! Copies card audio and images into a flat staging directory for packaging.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use futures_util::future::join_all;
use tokio::fs;
use tracing::{debug, warn};

use super::errors::StageError;
use crate::cache::{ImageFormat, AUDIO_EXTENSION};
use crate::models::{normalize_word, Card};

/// Materializes card media as `<staging>/<stem>.mp3` and `<staging>/<stem>.<image ext>`.
#[derive(Debug, Clone)]
pub struct MediaStager {
    dir: PathBuf,
}

impl MediaStager {
    /// Create a stager for `dir`. Does not touch the filesystem.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Staging directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the staging directory if needed and return it.
    pub async fn ensure_output_dir(&self) -> Result<PathBuf, StageError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StageError::OutputDir {
                path: self.dir.clone(),
                source,
            })?;
        Ok(self.dir.clone())
    }

    /// Stage audio and images for every card that has them, recording each
    /// card's `audio_file_name` and `image_file_name`.
    ///
    /// Cards without media are skipped. The first failure aborts the pass;
    /// files staged before it are removed again. Cards sharing a word share
    /// files, which are listed once. Different words whose stems collide get
    /// numbered stems (`hello_`, `hello__2`).
    pub async fn prepare_media_files(&self, cards: &mut [Card]) -> Result<Vec<PathBuf>, StageError> {
        let dir = self.ensure_output_dir().await?;
        let mut staged: Vec<PathBuf> = Vec::new();
        let mut stems = StemClaims::default();

        for card in cards.iter_mut() {
            if !card.has_audio() && !card.has_image() {
                continue;
            }

            let stem = stems.claim(card);
            if let Err(source) = self.stage_card(card, &dir, &stem, &mut staged).await {
                self.cleanup(&staged).await;
                return Err(StageError::Card {
                    word: card.word.clone(),
                    source,
                });
            }
        }

        Ok(staged)
    }

    async fn stage_card(
        &self,
        card: &mut Card,
        dir: &Path,
        stem: &str,
        staged: &mut Vec<PathBuf>,
    ) -> std::io::Result<()> {
        if card.has_audio() {
            let file_name = format!("{}.{}", stem, AUDIO_EXTENSION);
            let target = dir.join(&file_name);
            stage_audio(card, &target).await?;
            debug!("Staged audio for '{}' at {}", card.word, target.display());
            card.audio_file_name = Some(file_name);
            push_unique(staged, target);
        }

        if let Some(bytes) = read_image(card).await? {
            let format = ImageFormat::detect(&bytes);
            let file_name = format!("{}.{}", stem, format.extension());
            let target = dir.join(&file_name);
            fs::write(&target, &bytes).await?;
            debug!("Staged {} image for '{}' at {}", format, card.word, target.display());
            card.image_file_name = Some(file_name);
            push_unique(staged, target);
        }

        Ok(())
    }

    /// Delete staged files concurrently. Failures are logged, not returned.
    ///
    /// Returns how many files were removed.
    pub async fn cleanup(&self, files: &[PathBuf]) -> usize {
        let results = join_all(files.iter().map(|path| async move {
            (path, fs::remove_file(path).await)
        }))
        .await;

        let mut removed = 0;
        for (path, result) in results {
            match result {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove staged file {}: {}", path.display(), e),
            }
        }
        removed
    }
}

/// Stems handed out during one staging pass, keyed to the word that owns them.
#[derive(Default)]
struct StemClaims {
    owners: HashMap<String, String>,
}

impl StemClaims {
    fn claim(&mut self, card: &Card) -> String {
        let base = card.media_stem();
        let word = normalize_word(&card.word);
        let mut stem = base.clone();
        let mut n = 1;
        loop {
            match self.owners.get(&stem) {
                Some(owner) if *owner == word => return stem,
                Some(_) => {
                    n += 1;
                    stem = format!("{}_{}", base, n);
                }
                None => break,
            }
        }
        if n > 1 {
            warn!("Media name '{}' already taken, staging '{}' as '{}'", base, card.word, stem);
        }
        self.owners.insert(stem.clone(), word);
        stem
    }
}

fn push_unique(staged: &mut Vec<PathBuf>, path: PathBuf) {
    if !staged.contains(&path) {
        staged.push(path);
    }
}

async fn read_image(card: &Card) -> std::io::Result<Option<Vec<u8>>> {
    if let Some(source) = &card.image_path {
        fs::read(source).await.map(Some)
    } else {
        Ok(card.image_data.clone())
    }
}

async fn stage_audio(card: &Card, target: &Path) -> std::io::Result<()> {
    if let Some(source) = &card.audio_path {
        fs::copy(source, target).await.map(|_| ())
    } else if let Some(data) = &card.audio_data {
        fs::write(target, data).await
    } else {
        Ok(())
    }
}
