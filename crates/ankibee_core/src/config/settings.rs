//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::path::PathBuf;
use std::time::Duration;

use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::layout::DataLayout;
use crate::audio::{AudioOptions, DEFAULT_AUDIO_BASE_URL, DESKTOP_USER_AGENT};
use crate::dictionary::{DEFAULT_DICTIONARY_BASE_URL, DEFAULT_MALAY_DICTIONARY_BASE_URL};
use crate::export::{Packager, DEFAULT_INSTALL_HINT, DEFAULT_RUNTIME};
use crate::logging::LogLevel;
use crate::models::DEFAULT_DECK_NAME;
use crate::net::RetryPolicy;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Where data lives and where decks go.
    #[serde(default)]
    pub paths: PathSettings,

    /// Remote endpoints, timeouts and retry.
    #[serde(default)]
    pub network: NetworkSettings,

    /// Deck packaging.
    #[serde(default)]
    pub export: ExportSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// On-disk layout rooted at `paths.data_dir`.
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.paths.data_dir)
    }

    /// Replace values that cannot work with their defaults.
    ///
    /// Returns true if anything changed.
    pub fn sanitize(&mut self) -> bool {
        let defaults = NetworkSettings::default();
        let mut changed = false;

        if self.network.request_timeout_ms == 0 {
            warn!("network.request_timeout_ms must be positive, using default");
            self.network.request_timeout_ms = defaults.request_timeout_ms;
            changed = true;
        }
        if self.network.max_attempts == 0 {
            warn!("network.max_attempts must be at least 1, using default");
            self.network.max_attempts = defaults.max_attempts;
            changed = true;
        }
        if self.export.default_deck_name.trim().is_empty() {
            self.export.default_deck_name = default_deck_name();
            changed = true;
        }
        changed
    }
}

/// Sections that can be updated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Network,
    Export,
    Logging,
}

impl ConfigSection {
    /// Every section, in file order.
    pub const ALL: [ConfigSection; 4] = [
        ConfigSection::Paths,
        ConfigSection::Network,
        ConfigSection::Export,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Network => "network",
            ConfigSection::Export => "export",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the section.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Data and download directories",
            ConfigSection::Network => "Dictionary and pronunciation endpoints",
            ConfigSection::Export => "Deck packaging (runs <runtime> <script_path>)",
            ConfigSection::Logging => "Logging configuration (RUST_LOG overrides level)",
        }
    }
}

/// Path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root for caches, the saved deck and staging.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Folder suggested for exported decks.
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            downloads_dir: default_downloads_dir(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "AnkiBee")
}

fn default_data_dir() -> String {
    project_dirs()
        .map(|dirs| dirs.data_dir().display().to_string())
        .unwrap_or_else(|| ".ankibee".to_string())
}

fn default_downloads_dir() -> String {
    UserDirs::new()
        .and_then(|dirs| {
            dirs.download_dir()
                .map(|d| d.to_path_buf())
                .or_else(|| Some(dirs.home_dir().to_path_buf()))
        })
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".to_string())
}

/// Default location of the settings file.
pub fn default_settings_path() -> PathBuf {
    DataLayout::new(default_data_dir()).settings_file()
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    #[serde(default = "default_dictionary_base_url")]
    pub dictionary_base_url: String,

    #[serde(default = "default_audio_base_url")]
    pub audio_base_url: String,

    /// DBP search endpoint for Malay definitions.
    #[serde(default = "default_malay_dictionary_base_url")]
    pub malay_dictionary_base_url: String,

    /// Sent with audio requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-attempt bound for audio requests.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Audio attempts including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff step between audio attempts.
    #[serde(default = "default_backoff_step_ms")]
    pub backoff_step_ms: u64,

    /// How long a cached definition stays fresh.
    #[serde(default = "default_definition_ttl_days")]
    pub definition_ttl_days: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            dictionary_base_url: default_dictionary_base_url(),
            audio_base_url: default_audio_base_url(),
            malay_dictionary_base_url: default_malay_dictionary_base_url(),
            user_agent: default_user_agent(),
            request_timeout_ms: default_request_timeout_ms(),
            max_attempts: default_max_attempts(),
            backoff_step_ms: default_backoff_step_ms(),
            definition_ttl_days: default_definition_ttl_days(),
        }
    }
}

impl NetworkSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::linear(self.max_attempts, Duration::from_millis(self.backoff_step_ms))
    }

    pub fn definition_ttl(&self) -> Duration {
        Duration::from_secs(self.definition_ttl_days.saturating_mul(24 * 60 * 60))
    }

    /// Audio fetcher options built from these settings.
    pub fn audio_options(&self) -> AudioOptions {
        AudioOptions {
            base_url: self.audio_base_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout: self.request_timeout(),
            retry: self.retry_policy(),
        }
    }
}

fn default_dictionary_base_url() -> String {
    DEFAULT_DICTIONARY_BASE_URL.to_string()
}

fn default_audio_base_url() -> String {
    DEFAULT_AUDIO_BASE_URL.to_string()
}

fn default_malay_dictionary_base_url() -> String {
    DEFAULT_MALAY_DICTIONARY_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DESKTOP_USER_AGENT.to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_step_ms() -> u64 {
    1000
}

fn default_definition_ttl_days() -> u64 {
    30
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Interpreter used to run the packaging script.
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Packaging script.
    #[serde(default = "default_script_path")]
    pub script_path: String,

    /// Arguments proving the runtime can load the packaging library.
    #[serde(default = "default_check_args")]
    pub check_args: Vec<String>,

    /// Shown when the runtime check fails.
    #[serde(default = "default_install_hint")]
    pub install_hint: String,

    /// Deck name used when none is given.
    #[serde(default = "default_deck_name")]
    pub default_deck_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            script_path: default_script_path(),
            check_args: default_check_args(),
            install_hint: default_install_hint(),
            default_deck_name: default_deck_name(),
        }
    }
}

impl ExportSettings {
    /// Packager invocation built from these settings.
    pub fn packager(&self) -> Packager {
        Packager::new(&self.runtime, &self.script_path)
            .with_check_args(self.check_args.clone())
            .with_install_hint(&self.install_hint)
    }
}

fn default_runtime() -> String {
    DEFAULT_RUNTIME.to_string()
}

fn default_script_path() -> String {
    "packager/generate_deck.py".to_string()
}

fn default_check_args() -> Vec<String> {
    crate::export::DEFAULT_CHECK_ARGS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_install_hint() -> String {
    DEFAULT_INSTALL_HINT.to_string()
}

fn default_deck_name() -> String {
    DEFAULT_DECK_NAME.to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Level used when RUST_LOG is unset.
    #[serde(default)]
    pub level: LogLevel,
}
