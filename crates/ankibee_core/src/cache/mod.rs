//! On-disk caches for fetched media.
//!
//! The audio cache is content-addressed: a clip's key is derived from the
//! normalized word and region it was fetched for, so the same request always
//! maps to the same file. The image cache keys by card and picks each file's
//! extension from the image bytes.

mod audio;
mod dir;
mod error;
mod image;

pub use audio::{AudioCache, AUDIO_EXTENSION};
pub use dir::PurgeReport;
pub use error::{CacheError, CacheResult};
pub use image::{ImageCache, ImageFormat};
