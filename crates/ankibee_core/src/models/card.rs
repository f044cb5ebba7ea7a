//! Card and deck structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::enums::{AudioSource, Region};

/// Name given to a deck that has never been saved.
pub const DEFAULT_DECK_NAME: &str = "AnkiBee Deck";

/// Normalize a word for use as a cache key: trimmed and lowercased.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// A single spelling card.
///
/// Created by the UI layer. The core never rewrites `word` or `definition`;
/// staging only fills in `audio_file_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub word: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub audio_source: AudioSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_region: Option<Region>,
    /// Raw clip bytes, when the audio lives in memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_data: Option<Vec<u8>>,
    /// Clip on disk, preferred over `audio_data` when staging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<PathBuf>,
    /// File name inside the deck's media folder, set by staging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file_name: Option<String>,
    /// Optional picture shown on the answer side, in memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<Vec<u8>>,
    /// Picture on disk, preferred over `image_data` when staging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
    /// Image file name inside the deck's media folder, set by staging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file_name: Option<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Epoch milliseconds.
    #[serde(default)]
    pub updated_at: i64,
}

impl Card {
    /// Create a card with a fresh id and no audio.
    pub fn new(word: impl Into<String>, definition: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            word: word.into(),
            definition: definition.into(),
            notes: None,
            audio_source: AudioSource::None,
            audio_region: None,
            audio_data: None,
            audio_path: None,
            audio_file_name: None,
            image_data: None,
            image_path: None,
            image_file_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach in-memory audio fetched for `region`.
    pub fn with_audio(mut self, region: Region, data: Vec<u8>) -> Self {
        self.audio_source = AudioSource::for_region(region);
        self.audio_region = Some(region);
        self.audio_data = Some(data);
        self
    }

    /// Attach a user-supplied audio file.
    pub fn with_audio_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.audio_source = AudioSource::Custom;
        self.audio_path = Some(path.into());
        self
    }

    /// Attach an in-memory image.
    pub fn with_image(mut self, data: Vec<u8>) -> Self {
        self.image_data = Some(data);
        self
    }

    /// Attach an image file.
    pub fn with_image_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Whether the card carries an image either in memory or on disk.
    pub fn has_image(&self) -> bool {
        self.image_data.is_some() || self.image_path.is_some()
    }

    /// Whether the card carries audio either in memory or on disk.
    pub fn has_audio(&self) -> bool {
        self.audio_data.is_some() || self.audio_path.is_some()
    }

    /// A card can be exported once it has a word, a definition and audio.
    pub fn is_exportable(&self) -> bool {
        !self.word.trim().is_empty() && !self.definition.trim().is_empty() && self.has_audio()
    }

    /// Deterministic media file stem derived from the word.
    ///
    /// Lowercased, every character outside `[a-z0-9]` replaced by `_`.
    /// Distinct words can share a stem; staging disambiguates those.
    pub fn media_stem(&self) -> String {
        self.word
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '_' })
            .collect()
    }

    /// Audio file name for the undisambiguated stem.
    pub fn media_file_name(&self) -> String {
        format!("{}.mp3", self.media_stem())
    }
}

/// A named collection of cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub cards: Vec<Card>,
}

impl Default for Deck {
    fn default() -> Self {
        Self {
            name: DEFAULT_DECK_NAME.to_string(),
            cards: Vec::new(),
        }
    }
}
