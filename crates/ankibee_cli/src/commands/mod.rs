//! Command implementations

pub mod audio;
pub mod cache;
pub mod config;
pub mod deck;
pub mod define;
pub mod export;
