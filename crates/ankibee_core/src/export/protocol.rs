//! Typed JSON-over-stdio contract with the packaging tool.
//!
//! The request is written to the tool's stdin as one JSON object followed by
//! EOF. On success the tool prints exactly one JSON object to stdout and exits
//! 0; on failure it exits non-zero and may explain itself on stderr.
//!
//! ```text
//! stdin : {"protocolVersion":1,"deckName":..,"cards":[..],"mediaFiles":[..],"outputPath":..}
//! stdout: {"success":true,"outputPath":".."}
//!       | {"success":false,"error":".."}
//! ```

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::errors::ExportError;
use crate::models::Card;

/// Version of the request shape. Tools ignoring the field still work.
pub const PROTOCOL_VERSION: u32 = 1;

/// A staged card as the packager sees it.
///
/// Audio and the optional image travel as files in `mediaFiles`, referenced
/// by `audioFileName` and `imageFileName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCard {
    pub id: String,
    pub word: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub audio_file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file_name: Option<String>,
}

impl WireCard {
    /// Project a staged card. `None` if staging never named its audio file.
    pub fn from_staged(card: &Card) -> Option<Self> {
        Some(Self {
            id: card.id.clone(),
            word: card.word.clone(),
            definition: card.definition.clone(),
            notes: card.notes.clone().filter(|n| !n.trim().is_empty()),
            audio_file_name: card.audio_file_name.clone()?,
            image_file_name: card.image_file_name.clone(),
        })
    }
}

/// Everything the packager needs to build one deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub protocol_version: u32,
    pub deck_name: String,
    pub cards: Vec<WireCard>,
    pub media_files: Vec<PathBuf>,
    pub output_path: PathBuf,
}

impl ExportRequest {
    /// Build and validate a request from staged cards.
    pub fn new(
        deck_name: impl Into<String>,
        staged_cards: &[Card],
        media_files: Vec<PathBuf>,
        output_path: PathBuf,
    ) -> Result<Self, ExportError> {
        let cards = staged_cards
            .iter()
            .map(|card| {
                WireCard::from_staged(card).ok_or_else(|| {
                    ExportError::InvalidRequest(format!("card '{}' has no staged audio", card.word))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request = Self {
            protocol_version: PROTOCOL_VERSION,
            deck_name: deck_name.into(),
            cards,
            media_files,
            output_path,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check the invariants the packager relies on.
    pub fn validate(&self) -> Result<(), ExportError> {
        let invalid = |msg: String| Err(ExportError::InvalidRequest(msg));

        if self.deck_name.trim().is_empty() {
            return invalid("deck name is empty".to_string());
        }
        if self.cards.is_empty() {
            return invalid("no cards".to_string());
        }
        if self.output_path.as_os_str().is_empty() {
            return invalid("output path is empty".to_string());
        }

        let staged: HashSet<&str> = self
            .media_files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        for card in &self.cards {
            if card.word.trim().is_empty() || card.definition.trim().is_empty() {
                return invalid(format!("card '{}' is missing a word or definition", card.id));
            }
            if !staged.contains(card.audio_file_name.as_str()) {
                return invalid(format!(
                    "audio '{}' for '{}' is not among the media files",
                    card.audio_file_name, card.word
                ));
            }
            if let Some(image) = &card.image_file_name {
                if !staged.contains(image.as_str()) {
                    return invalid(format!(
                        "image '{}' for '{}' is not among the media files",
                        image, card.word
                    ));
                }
            }
        }
        Ok(())
    }

    /// Serialize for the packager's stdin.
    pub fn to_json(&self) -> Result<Vec<u8>, ExportError> {
        serde_json::to_vec(self).map_err(|e| ExportError::InvalidRequest(e.to_string()))
    }
}

/// The packager's stdout object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagerResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PackagerResponse {
    /// Decode captured stdout. Surrounding whitespace is ignored.
    pub fn decode(stdout: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(stdout.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Region;

    fn staged(word: &str) -> Card {
        let mut card = Card::new(word, "a definition").with_audio(Region::Us, vec![1]);
        card.audio_file_name = Some(card.media_file_name());
        card
    }

    #[test]
    fn request_serializes_camel_case_without_audio_bytes() {
        let card = staged("apple");
        let request = ExportRequest::new(
            "Fruit",
            &[card],
            vec![PathBuf::from("/stage/apple.mp3")],
            PathBuf::from("/out/Fruit.apkg"),
        )
        .unwrap();

        let json: serde_json::Value = serde_json::from_slice(&request.to_json().unwrap()).unwrap();
        assert_eq!(json["protocolVersion"], 1);
        assert_eq!(json["deckName"], "Fruit");
        assert_eq!(json["cards"][0]["audioFileName"], "apple.mp3");
        assert!(json["cards"][0].get("audioData").is_none());
        assert_eq!(json["mediaFiles"][0], "/stage/apple.mp3");
        assert_eq!(json["outputPath"], "/out/Fruit.apkg");
    }

    #[test]
    fn unstaged_card_is_rejected() {
        let card = Card::new("apple", "fruit").with_audio(Region::Us, vec![1]);
        let err = ExportRequest::new("Deck", &[card], vec![], PathBuf::from("/o.apkg")).unwrap_err();
        assert!(matches!(err, ExportError::InvalidRequest(_)));
    }

    #[test]
    fn audio_must_be_among_media_files() {
        let err = ExportRequest::new(
            "Deck",
            &[staged("apple")],
            vec![PathBuf::from("/stage/pear.mp3")],
            PathBuf::from("/o.apkg"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("apple.mp3"));
    }

    #[test]
    fn image_is_sent_only_when_staged() {
        let plain = staged("apple");
        let mut pictured = staged("pear");
        pictured.image_file_name = Some("pear.png".to_string());
        let media = vec![
            PathBuf::from("/stage/apple.mp3"),
            PathBuf::from("/stage/pear.mp3"),
            PathBuf::from("/stage/pear.png"),
        ];

        let request =
            ExportRequest::new("Deck", &[plain, pictured.clone()], media, PathBuf::from("/o.apkg")).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&request.to_json().unwrap()).unwrap();
        assert!(json["cards"][0].get("imageFileName").is_none());
        assert_eq!(json["cards"][1]["imageFileName"], "pear.png");

        let err = ExportRequest::new(
            "Deck",
            &[pictured],
            vec![PathBuf::from("/stage/pear.mp3")],
            PathBuf::from("/o.apkg"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("pear.png"));
    }

    #[test]
    fn decodes_success_and_failure_responses() {
        let ok = PackagerResponse::decode("{\"success\": true, \"outputPath\": \"/o.apkg\"}\n").unwrap();
        assert!(ok.success);
        assert_eq!(ok.output_path, Some(PathBuf::from("/o.apkg")));

        let failed = PackagerResponse::decode(r#"{"success": false, "error": "boom"}"#).unwrap();
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("boom"));

        assert!(PackagerResponse::decode("Traceback (most recent call last)").is_err());
    }
}
