//! Word definitions.
//!
//! [`DictionaryClient`] formats the first dictionary entry for a word into a
//! compact card-ready string and keeps the result in a [`DefinitionCache`]
//! for a configurable time-to-live (30 days by default).
//!
//! [`MalayDictionaryClient`] searches the DBP dictionary for Malay words and
//! caches whole search results the same way.

mod cache;
mod client;
mod dbp;
mod error;
mod format;
mod malay;

pub use cache::{CacheEntry, DefinitionCache, DefinitionMap, DEFAULT_DEFINITION_TTL};
pub use client::{DictionaryClient, DEFAULT_DICTIONARY_BASE_URL};
pub use dbp::{parse_dbp_page, DbpResult, MalayDefinition, DEFAULT_MALAY_SOURCE};
pub use error::{DictionaryError, DictionaryResult};
pub use format::{format_definition, DictionaryEntry, Meaning, Sense};
pub use malay::{
    MalayCache, MalayCacheEntry, MalayDictionaryClient, MalayMap, DEFAULT_MALAY_DICTIONARY_BASE_URL,
    MALAY_REQUEST_TIMEOUT,
};
