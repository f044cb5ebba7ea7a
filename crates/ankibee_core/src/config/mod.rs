//! Configuration management for AnkiBee.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//! - [`DataLayout`], which derives every on-disk path from the data directory
//!
//! # Example
//!
//! ```no_run
//! use ankibee_core::config::{ConfigManager, ConfigSection};
//! use ankibee_core::logging::LogLevel;
//!
//! let mut config = ConfigManager::new("/tmp/ankibee/settings.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Data dir: {}", config.settings().paths.data_dir);
//!
//! config.settings_mut().logging.level = LogLevel::Debug;
//! config.update_section(ConfigSection::Logging).unwrap();
//! ```

mod layout;
mod manager;
mod settings;

pub use layout::DataLayout;
pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    default_settings_path, ConfigSection, ExportSettings, LoggingSettings, NetworkSettings,
    PathSettings, Settings,
};
