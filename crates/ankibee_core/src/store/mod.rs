//! Persistence of the working deck between sessions.

mod deck_store;
mod error;

pub use deck_store::{DeckStore, StoredCard, StoredDeck};
pub use error::{StoreError, StoreResult};
