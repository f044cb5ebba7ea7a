//! Parser for DBP (Dewan Bahasa dan Pustaka) search result pages.
//!
//! A results page carries one or more `Definisi : ...` blocks. Each block runs
//! until the first parenthesised source tag such as `(Kamus Dewan Edisi
//! Keempat)`, or the end of the page.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Source reported when a block carries no source tag.
pub const DEFAULT_MALAY_SOURCE: &str = "DBP";

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

regex!(DEFINITION_MARKER, r"Definisi\s*:\s*");
regex!(SOURCE_TAG, r"\s*\(([^)]+)\)");
regex!(HTML_TAG, r"<[^>]*>");
regex!(WHITESPACE, r"\s+");
regex!(PHONETIC, r"\[([^\]]+)\]");
regex!(JAWI, r"\|\s*(\S+)");
regex!(LEADING_POS, r"^\[([^\]]+)\]\s*");

/// One sense from a DBP page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MalayDefinition {
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jawi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub malay_definition: String,
    pub source: String,
    /// The block as it appeared in the page, markup included.
    pub raw_text: String,
}

/// Every sense found for one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbpResult {
    pub word: String,
    pub definitions: Vec<MalayDefinition>,
    pub has_results: bool,
}

impl DbpResult {
    /// A result with no senses.
    pub fn empty(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            definitions: Vec::new(),
            has_results: false,
        }
    }

    /// Render the senses as card text, one per line.
    pub fn to_card_text(&self) -> String {
        self.definitions
            .iter()
            .map(|d| match &d.part_of_speech {
                Some(pos) => format!("[{}] {}", pos, d.malay_definition),
                None => d.malay_definition.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Extract every definition block from `html`, attributing them to `word`.
pub fn parse_dbp_page(html: &str, word: &str) -> DbpResult {
    let mut definitions = Vec::new();
    let mut pos = 0;

    while let Some(marker) = DEFINITION_MARKER.find_at(html, pos) {
        let start = marker.end();
        let (end, source) = match SOURCE_TAG.captures_at(html, start) {
            Some(caps) => {
                let tag = caps.get(0).map_or(html.len(), |m| m.start());
                (tag, caps.get(1).map(|m| clean_html_text(m.as_str())))
            }
            None => (html.len(), None),
        };
        pos = end;

        let raw = html[start..end].trim();
        if let Some(definition) = parse_block(raw, word, source) {
            definitions.push(definition);
        }
        if end >= html.len() {
            break;
        }
    }

    DbpResult {
        word: word.to_string(),
        has_results: !definitions.is_empty(),
        definitions,
    }
}

fn parse_block(raw: &str, word: &str, source: Option<String>) -> Option<MalayDefinition> {
    if raw.is_empty() {
        return None;
    }

    let cleaned = clean_html_text(raw);
    let phonetic = PHONETIC
        .captures(raw)
        .map(|c| clean_html_text(&c[1]))
        .filter(|p| !p.is_empty());
    let jawi = JAWI
        .captures(raw)
        .map(|c| clean_html_text(&c[1]))
        .filter(|j| !j.is_empty());

    let (part_of_speech, text) = match LEADING_POS.captures(&cleaned) {
        Some(caps) => {
            let rest = cleaned[caps.get(0).map_or(0, |m| m.end())..].to_string();
            (Some(caps[1].to_string()), rest)
        }
        None => (None, cleaned.clone()),
    };
    if text.is_empty() {
        return None;
    }

    Some(MalayDefinition {
        word: word.to_string(),
        phonetic,
        jawi,
        part_of_speech,
        context: None,
        malay_definition: text,
        source: source
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_MALAY_SOURCE.to_string()),
        raw_text: raw.to_string(),
    })
}

/// Strip tags, decode entities and collapse whitespace.
fn clean_html_text(html: &str) -> String {
    let text = HTML_TAG.replace_all(html, "");
    let text = html_escape::decode_html_entities(&text);
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}
