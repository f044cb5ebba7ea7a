//! AnkiBee Core - Backend logic for AnkiBee
//!
//! This crate contains the data-acquisition and export pipeline with zero UI
//! dependencies:
//! - English and Malay (DBP) dictionary definitions with TTL JSON caches
//! - Pronunciation audio with retry/backoff and a content-keyed disk cache
//! - Card images with format sniffing and their own disk cache
//! - Media staging and the subprocess protocol used to build `.apkg` decks
//!
//! It can be driven by the bundled CLI or by any other front end.

pub mod audio;
pub mod cache;
pub mod config;
pub mod dictionary;
pub mod export;
pub mod logging;
pub mod models;
pub mod net;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
