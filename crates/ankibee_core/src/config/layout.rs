//! Where AnkiBee keeps things on disk.

use std::path::{Path, PathBuf};

use crate::cache::{AudioCache, ImageCache};
use crate::dictionary::{DefinitionCache, MalayCache};
use crate::export::MediaStager;
use crate::store::DeckStore;

use super::settings::Settings;

/// Every on-disk path, derived from one data directory.
///
/// ```text
/// <data_dir>/
///   audio-cache/<key>.mp3
///   image-cache/<key>.<jpg|png|gif|webp|bmp>
///   dictionary-cache.json
///   malay-dictionary-cache.json
///   deck-data.json
///   anki-exports/
///   settings.toml
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn audio_cache_dir(&self) -> PathBuf {
        self.root.join("audio-cache")
    }

    pub fn image_cache_dir(&self) -> PathBuf {
        self.root.join("image-cache")
    }

    pub fn dictionary_cache_file(&self) -> PathBuf {
        self.root.join("dictionary-cache.json")
    }

    pub fn malay_cache_file(&self) -> PathBuf {
        self.root.join("malay-dictionary-cache.json")
    }

    pub fn deck_file(&self) -> PathBuf {
        self.root.join("deck-data.json")
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join("anki-exports")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join("settings.toml")
    }

    /// Audio cache in this layout.
    pub fn audio_cache(&self) -> AudioCache {
        AudioCache::new(self.audio_cache_dir())
    }

    /// Image cache in this layout.
    pub fn image_cache(&self) -> ImageCache {
        ImageCache::new(self.image_cache_dir())
    }

    /// Malay definition cache in this layout, with the configured TTL.
    pub fn malay_cache(&self, settings: &Settings) -> MalayCache {
        MalayCache::new(self.malay_cache_file(), settings.network.definition_ttl())
    }

    /// Definition cache in this layout, with the configured TTL.
    pub fn definition_cache(&self, settings: &Settings) -> DefinitionCache {
        DefinitionCache::new(self.dictionary_cache_file(), settings.network.definition_ttl())
    }

    /// Deck store in this layout.
    pub fn deck_store(&self) -> DeckStore {
        DeckStore::new(self.deck_file(), self.audio_cache(), self.image_cache())
    }

    /// Media stager in this layout.
    pub fn stager(&self) -> MediaStager {
        MediaStager::new(self.staging_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_root() {
        let layout = DataLayout::new("/data/ankibee");
        assert_eq!(layout.audio_cache_dir(), PathBuf::from("/data/ankibee/audio-cache"));
        assert_eq!(layout.deck_file(), PathBuf::from("/data/ankibee/deck-data.json"));
        assert_eq!(layout.staging_dir(), PathBuf::from("/data/ankibee/anki-exports"));
        assert_eq!(layout.settings_file(), PathBuf::from("/data/ankibee/settings.toml"));
        assert_eq!(layout.audio_cache().dir(), Path::new("/data/ankibee/audio-cache"));
        assert_eq!(layout.image_cache().dir(), Path::new("/data/ankibee/image-cache"));
        assert_eq!(
            layout.malay_cache_file(),
            PathBuf::from("/data/ankibee/malay-dictionary-cache.json")
        );
    }
}
