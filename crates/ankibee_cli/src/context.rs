//! Wires configuration into core services.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use ankibee_core::audio::AudioFetcher;
use ankibee_core::config::{default_settings_path, ConfigManager, DataLayout, Settings};
use ankibee_core::dictionary::{DictionaryClient, MalayDictionaryClient};
use ankibee_core::export::DeckExporter;
use ankibee_core::net::{HttpFetch, ReqwestFetch};
use ankibee_core::store::DeckStore;

/// Loaded settings plus the shared HTTP transport.
pub struct App {
    config: ConfigManager,
    layout: DataLayout,
    http: Arc<dyn HttpFetch>,
}

impl App {
    /// Load (or create) the settings file and build the layout.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let path = config_path.unwrap_or_else(default_settings_path);
        let mut config = ConfigManager::new(&path);
        config
            .load_or_create()
            .with_context(|| format!("loading settings from {}", path.display()))?;
        config
            .ensure_dirs_exist()
            .context("creating data directories")?;

        let layout = config.settings().layout();
        Ok(Self {
            config,
            layout,
            http: Arc::new(ReqwestFetch::new()),
        })
    }

    pub fn settings(&self) -> &Settings {
        self.config.settings()
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn dictionary(&self) -> DictionaryClient {
        DictionaryClient::new(
            Arc::clone(&self.http),
            self.layout.definition_cache(self.settings()),
            &self.settings().network.dictionary_base_url,
        )
    }

    pub fn malay_dictionary(&self) -> MalayDictionaryClient {
        let network = &self.settings().network;
        MalayDictionaryClient::new(
            Arc::clone(&self.http),
            self.layout.malay_cache(self.settings()),
            &network.malay_dictionary_base_url,
            &network.user_agent,
        )
    }

    pub fn audio(&self) -> AudioFetcher {
        AudioFetcher::new(
            Arc::clone(&self.http),
            self.layout.audio_cache(),
            self.settings().network.audio_options(),
        )
    }

    pub fn deck_store(&self) -> DeckStore {
        self.layout.deck_store()
    }

    pub fn exporter(&self) -> DeckExporter {
        DeckExporter::new(
            self.settings().export.packager(),
            self.layout.stager(),
            &self.settings().paths.downloads_dir,
        )
    }
}
