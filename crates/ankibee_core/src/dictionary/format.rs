//! Response shapes and the card text formatter.

use serde::Deserialize;

use super::error::{DictionaryError, DictionaryResult};

/// Synonyms shown per meaning.
const MAX_SYNONYMS: usize = 3;

/// One element of the dictionary API's response array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
}

/// Senses grouped under a part of speech.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<Sense>,
}

/// A single definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sense {
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

/// Format the first entry of a response into card text.
///
/// ```text
/// /fəˈnɛtɪk/
///
/// [noun]
/// First definition.
/// → "An example."
/// ≈ syn1, syn2, syn3
///
/// [verb]
/// ...
/// ```
///
/// Meanings without any definition are skipped.
pub fn format_definition(entries: &[DictionaryEntry]) -> DictionaryResult<String> {
    let entry = entries
        .first()
        .ok_or_else(|| DictionaryError::invalid_data("response contained no entries"))?;

    let blocks: Vec<String> = entry
        .meanings
        .iter()
        .filter_map(|meaning| {
            let sense = meaning.definitions.first()?;
            let mut block = format!("[{}]\n{}", meaning.part_of_speech, sense.definition);

            if let Some(example) = sense.example.as_deref().filter(|e| !e.is_empty()) {
                block.push_str(&format!("\n→ \"{}\"", example));
            }
            if !sense.synonyms.is_empty() {
                let shown: Vec<&str> = sense
                    .synonyms
                    .iter()
                    .take(MAX_SYNONYMS)
                    .map(String::as_str)
                    .collect();
                block.push_str(&format!("\n≈ {}", shown.join(", ")));
            }
            Some(block)
        })
        .collect();

    if blocks.is_empty() {
        return Err(DictionaryError::invalid_data("entry has no definitions"));
    }

    let mut out = String::new();
    if let Some(phonetic) = entry.phonetic.as_deref().filter(|p| !p.is_empty()) {
        out.push_str(phonetic);
        out.push_str("\n\n");
    }
    out.push_str(&blocks.join("\n\n"));
    Ok(out)
}
