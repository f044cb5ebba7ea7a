//! Data models for AnkiBee.
//!
//! - Cards and decks as authored in the UI layer
//! - Audio source/region enums shared by the fetchers and the store

mod card;
mod enums;

pub use card::{normalize_word, Card, Deck, DEFAULT_DECK_NAME};
pub use enums::{AudioSource, Region};
