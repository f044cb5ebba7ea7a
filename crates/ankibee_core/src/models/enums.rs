//! Enums shared by cards, fetchers and the deck store.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pronunciation region offered by the audio provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// American English.
    #[default]
    Us,
    /// British English.
    Gb,
}

impl Region {
    /// Provider code used in cache keys and URLs.
    pub fn code(&self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Gb => "gb",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us" => Ok(Region::Us),
            "gb" | "uk" => Ok(Region::Gb),
            other => Err(format!("unknown region '{}' (expected 'us' or 'gb')", other)),
        }
    }
}

/// Where a card's audio came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AudioSource {
    /// No audio attached.
    #[default]
    #[serde(rename = "none")]
    None,
    /// User-supplied file.
    #[serde(rename = "custom")]
    Custom,
    /// Provider pronunciation, US.
    #[serde(rename = "google-us")]
    GoogleUs,
    /// Provider pronunciation, UK.
    #[serde(rename = "google-uk")]
    GoogleUk,
}

impl AudioSource {
    /// Source implied by fetching provider audio for `region`.
    pub fn for_region(region: Region) -> Self {
        match region {
            Region::Us => AudioSource::GoogleUs,
            Region::Gb => AudioSource::GoogleUk,
        }
    }
}

impl std::fmt::Display for AudioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioSource::None => write!(f, "none"),
            AudioSource::Custom => write!(f, "custom"),
            AudioSource::GoogleUs => write!(f, "google-us"),
            AudioSource::GoogleUk => write!(f, "google-uk"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_parses_aliases() {
        assert_eq!("US".parse::<Region>().unwrap(), Region::Us);
        assert_eq!("uk".parse::<Region>().unwrap(), Region::Gb);
        assert!("fr".parse::<Region>().is_err());
    }

    #[test]
    fn audio_source_uses_wire_names() {
        let json = serde_json::to_string(&AudioSource::GoogleUk).unwrap();
        assert_eq!(json, "\"google-uk\"");
        assert_eq!(AudioSource::for_region(Region::Us).to_string(), "google-us");
    }
}
