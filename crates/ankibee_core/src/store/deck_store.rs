//! JSON deck file with media kept in the audio and image caches.
//!
//! Clip and image bytes never go into the JSON. Each saved clip gets a fresh
//! cache key `{id}-{source}-{epochMs}`, each image `{id}-image-{epochMs}`;
//! older files are left for `cache purge`.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use super::error::{StoreError, StoreResult};
use crate::cache::{AudioCache, ImageCache};
use crate::models::{AudioSource, Card, Deck, Region};

/// A card as written to the deck file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCard {
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
    /// Audio cache key holding this card's clip.
    #[serde(default)]
    pub audio_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<PathBuf>,
    /// Image cache key holding this card's picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl StoredCard {
    fn from_card(card: &Card, audio_key: Option<String>, image_key: Option<String>) -> Self {
        Self {
            id: card.id.clone(),
            word: card.word.clone(),
            definition: card.definition.clone(),
            notes: card.notes.clone(),
            audio_source: card.audio_source,
            audio_region: card.audio_region,
            audio_key,
            audio_path: card.audio_path.clone(),
            image_key,
            image_path: card.image_path.clone(),
            created_at: card.created_at,
            updated_at: card.updated_at,
        }
    }

    fn into_card(self, audio_data: Option<Vec<u8>>, image_data: Option<Vec<u8>>) -> Card {
        Card {
            id: self.id,
            word: self.word,
            definition: self.definition,
            notes: self.notes,
            audio_source: self.audio_source,
            audio_region: self.audio_region,
            audio_data,
            audio_path: self.audio_path,
            audio_file_name: None,
            image_data,
            image_path: self.image_path,
            image_file_name: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The deck file layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDeck {
    pub name: String,
    #[serde(default)]
    pub cards: Vec<StoredCard>,
}

/// Saves and restores the working deck.
#[derive(Debug, Clone)]
pub struct DeckStore {
    path: PathBuf,
    audio: AudioCache,
    images: ImageCache,
}

impl DeckStore {
    /// Store the deck at `path`, clips in `audio` and pictures in `images`.
    pub fn new(path: impl Into<PathBuf>, audio: AudioCache, images: ImageCache) -> Self {
        Self {
            path: path.into(),
            audio,
            images,
        }
    }

    /// Deck file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `deck`, moving in-memory media into the caches.
    pub async fn save_deck(&self, deck: &Deck) -> StoreResult<()> {
        let saved_at = chrono::Utc::now().timestamp_millis();
        let mut cards = Vec::with_capacity(deck.cards.len());

        for card in &deck.cards {
            let audio_key = match &card.audio_data {
                Some(data) if card.audio_source != AudioSource::None => {
                    let key = format!("{}-{}-{}", card.id, card.audio_source, saved_at);
                    self.audio.save(&key, data).await?;
                    Some(key)
                }
                _ => None,
            };
            let image_key = match &card.image_data {
                Some(data) => {
                    let key = format!("{}-image-{}", card.id, saved_at);
                    self.images.save(&key, data).await?;
                    Some(key)
                }
                None => None,
            };
            cards.push(StoredCard::from_card(card, audio_key, image_key));
        }

        let stored = StoredDeck {
            name: deck.name.clone(),
            cards,
        };
        let json = serde_json::to_string_pretty(&stored)?;
        self.atomic_write(json.as_bytes()).await?;

        info!(
            "Saved deck '{}' ({} cards) to {}",
            deck.name,
            deck.cards.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Load the saved deck, or an empty default deck if none was saved.
    ///
    /// Cards whose clip or image has gone missing from the cache load
    /// without it.
    pub async fn load_deck(&self) -> StoreResult<Deck> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No saved deck at {}, starting fresh", self.path.display());
                return Ok(Deck::default());
            }
            Err(e) => return Err(StoreError::io("reading", &self.path, e)),
        };

        let stored: StoredDeck =
            serde_json::from_slice(&content).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let mut cards = Vec::with_capacity(stored.cards.len());
        for card in stored.cards {
            let audio_data = self.restore_audio(&card).await;
            let image_data = self.restore_image(&card).await;
            cards.push(card.into_card(audio_data, image_data));
        }

        info!("Loaded deck '{}' ({} cards)", stored.name, cards.len());
        Ok(Deck {
            name: stored.name,
            cards,
        })
    }

    async fn restore_audio(&self, card: &StoredCard) -> Option<Vec<u8>> {
        let key = card.audio_key.as_deref()?;
        if card.audio_source == AudioSource::None {
            return None;
        }
        if !self.audio.check_exists(key).await {
            warn!("Audio for card '{}' is no longer cached ({})", card.word, key);
            return None;
        }
        match self.audio.read(key).await {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Failed to load audio for card '{}': {}", card.word, e);
                None
            }
        }
    }

    async fn restore_image(&self, card: &StoredCard) -> Option<Vec<u8>> {
        let key = card.image_key.as_deref()?;
        if !self.images.check_exists(key).await {
            warn!("Image for card '{}' is no longer cached ({})", card.word, key);
            return None;
        }
        match self.images.read(key).await {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Failed to load image for card '{}': {}", card.word, e);
                None
            }
        }
    }

    async fn atomic_write(&self, content: &[u8]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io("creating directory for", &self.path, e))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content)
            .await
            .map_err(|e| StoreError::io("writing", &temp_path, e))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::io("replacing", &self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_DECK_NAME;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> DeckStore {
        DeckStore::new(
            dir.join("deck-data.json"),
            AudioCache::new(dir.join("audio-cache")),
            ImageCache::new(dir.join("image-cache")),
        )
    }

    #[tokio::test]
    async fn missing_file_loads_default_deck() {
        let dir = tempdir().unwrap();
        let deck = store_in(dir.path()).load_deck().await.unwrap();
        assert_eq!(deck.name, DEFAULT_DECK_NAME);
        assert!(deck.cards.is_empty());
    }

    #[tokio::test]
    async fn save_and_load_restores_audio_from_cache() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let deck = Deck {
            name: "Week 3".to_string(),
            cards: vec![
                Card::new("apple", "a fruit").with_audio(Region::Gb, b"clip".to_vec()),
                Card::new("pear", "another fruit"),
            ],
        };

        store.save_deck(&deck).await.unwrap();
        let loaded = store.load_deck().await.unwrap();

        assert_eq!(loaded.name, "Week 3");
        assert_eq!(loaded.cards.len(), 2);
        assert_eq!(loaded.cards[0].audio_data.as_deref(), Some(&b"clip"[..]));
        assert_eq!(loaded.cards[0].audio_region, Some(Region::Gb));
        assert_eq!(loaded.cards[1].audio_data, None);
        assert_eq!(loaded.cards[0].id, deck.cards[0].id);
    }

    #[tokio::test]
    async fn deck_file_holds_keys_not_bytes() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let card = Card::new("apple", "a fruit").with_audio(Region::Us, vec![1, 2, 3]);
        let id = card.id.clone();
        store
            .save_deck(&Deck {
                name: "D".to_string(),
                cards: vec![card],
            })
            .await
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        let key = json["cards"][0]["audioKey"].as_str().unwrap();
        assert!(key.starts_with(&format!("{}-google-us-", id)));
        assert!(json["cards"][0].get("audioData").is_none());
        assert!(AudioCache::new(dir.path().join("audio-cache")).path_for(key).exists());
    }

    #[tokio::test]
    async fn purged_clip_loads_card_without_audio() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store
            .save_deck(&Deck {
                name: "D".to_string(),
                cards: vec![Card::new("apple", "a fruit").with_audio(Region::Us, vec![9])],
            })
            .await
            .unwrap();
        std::fs::remove_dir_all(dir.path().join("audio-cache")).unwrap();

        let loaded = store.load_deck().await.unwrap();
        assert_eq!(loaded.cards.len(), 1);
        assert!(loaded.cards[0].audio_data.is_none());
    }

    #[tokio::test]
    async fn images_round_trip_through_image_cache() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let png = vec![0x89, b'P', b'N', b'G', 1, 2];
        let card = Card::new("apple", "a fruit")
            .with_audio(Region::Us, vec![1])
            .with_image(png.clone());
        let id = card.id.clone();
        store
            .save_deck(&Deck {
                name: "D".to_string(),
                cards: vec![card, Card::new("pear", "plain")],
            })
            .await
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        let key = json["cards"][0]["imageKey"].as_str().unwrap();
        assert!(key.starts_with(&format!("{}-image-", id)));
        assert!(json["cards"][0].get("imageData").is_none());
        assert!(json["cards"][1].get("imageKey").is_none());
        assert!(dir.path().join("image-cache").join(format!("{}.png", key)).exists());

        let loaded = store.load_deck().await.unwrap();
        assert_eq!(loaded.cards[0].image_data, Some(png));
        assert_eq!(loaded.cards[1].image_data, None);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(store.path(), "{ not json").unwrap();

        let err = store.load_deck().await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }
}
