//! Card image store with format sniffing.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tracing::{debug, warn};

use super::dir::{purge_dir, validate_key, PurgeReport};
use super::error::{CacheError, CacheResult};

/// Image formats recognized by their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    /// Every format, in lookup order.
    pub const ALL: [ImageFormat; 5] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Gif,
        ImageFormat::Webp,
        ImageFormat::Bmp,
    ];

    /// Sniff the format from magic bytes. Unknown data is treated as PNG.
    pub fn detect(bytes: &[u8]) -> ImageFormat {
        match bytes {
            [0xFF, 0xD8, ..] => ImageFormat::Jpeg,
            [0x89, b'P', b'N', b'G', ..] => ImageFormat::Png,
            [b'G', b'I', b'F', ..] => ImageFormat::Gif,
            [_, _, _, _, _, _, _, _, b'W', b'E', b'B', b'P', ..] => ImageFormat::Webp,
            [b'B', b'M', ..] => ImageFormat::Bmp,
            _ => ImageFormat::Png,
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
            ImageFormat::Bmp => "bmp",
        }
    }

    /// Extensions a stored file of this format may carry.
    fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageFormat::Jpeg => &["jpg", "jpeg"],
            ImageFormat::Png => &["png"],
            ImageFormat::Gif => &["gif"],
            ImageFormat::Webp => &["webp"],
            ImageFormat::Bmp => &["bmp"],
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Byte storage for card images, one file per key.
///
/// The extension is chosen from the image content on save, so lookups try
/// every known extension.
#[derive(Debug, Clone)]
pub struct ImageCache {
    dir: PathBuf,
}

impl ImageCache {
    /// Create a cache rooted at `dir`. Does not touch the filesystem.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the image stored under `key`, if any.
    pub async fn find(&self, key: &str) -> Option<PathBuf> {
        validate_key(key).ok()?;
        for path in self.candidates(key) {
            if fs::try_exists(&path).await.unwrap_or(false) {
                return Some(path);
            }
        }
        None
    }

    /// Whether an image is stored under `key`.
    pub async fn check_exists(&self, key: &str) -> bool {
        self.find(key).await.is_some()
    }

    /// Read the image stored under `key`.
    pub async fn read(&self, key: &str) -> CacheResult<Vec<u8>> {
        validate_key(key)?;
        let Some(path) = self.find(key).await else {
            let missing = self.dir.join(key);
            return Err(CacheError::io(
                "reading",
                missing,
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        };
        fs::read(&path)
            .await
            .map_err(|e| CacheError::io("reading", path, e))
    }

    /// Store `bytes` under `key` with an extension matching their format.
    ///
    /// A previous image under the same key with a different extension is
    /// removed. Returns the path written.
    pub async fn save(&self, key: &str, bytes: &[u8]) -> CacheResult<PathBuf> {
        validate_key(key)?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CacheError::io("creating", &self.dir, e))?;

        let format = ImageFormat::detect(bytes);
        let path = self.dir.join(format!("{}.{}", key, format.extension()));
        fs::write(&path, bytes)
            .await
            .map_err(|e| CacheError::io("writing", &path, e))?;

        for stale in self.candidates(key).filter(|p| *p != path) {
            match fs::remove_file(&stale).await {
                Ok(()) => debug!("Replaced image {}", stale.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove stale image {}: {}", stale.display(), e),
            }
        }

        debug!("Cached {} image ({} bytes) at {}", format, bytes.len(), path.display());
        Ok(path)
    }

    /// Delete every image older than `max_age`. Best-effort.
    pub async fn purge_older_than(&self, max_age: Duration) -> PurgeReport {
        purge_dir(&self.dir, max_age).await
    }

    fn candidates<'a>(&'a self, key: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
        ImageFormat::ALL
            .iter()
            .flat_map(|format| format.extensions().iter())
            .map(move |ext| self.dir.join(format!("{}.{}", key, ext)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0];
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A];
    const WEBP: &[u8] = b"RIFF\x10\x00\x00\x00WEBPVP8 ";

    #[test]
    fn detects_formats_from_magic_bytes() {
        assert_eq!(ImageFormat::detect(JPEG), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::detect(PNG), ImageFormat::Png);
        assert_eq!(ImageFormat::detect(b"GIF89a"), ImageFormat::Gif);
        assert_eq!(ImageFormat::detect(WEBP), ImageFormat::Webp);
        assert_eq!(ImageFormat::detect(b"BM\x00\x00"), ImageFormat::Bmp);
    }

    #[test]
    fn unknown_or_short_data_defaults_to_png() {
        assert_eq!(ImageFormat::detect(b""), ImageFormat::Png);
        assert_eq!(ImageFormat::detect(b"plain text"), ImageFormat::Png);
        assert_eq!(ImageFormat::detect(b"RIFF"), ImageFormat::Png);
    }

    #[tokio::test]
    async fn save_picks_extension_from_content() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path().join("image-cache"));

        assert!(!cache.check_exists("card-1").await);
        let path = cache.save("card-1", JPEG).await.unwrap();

        assert_eq!(path, cache.dir().join("card-1.jpg"));
        assert_eq!(cache.find("card-1").await, Some(path));
        assert_eq!(cache.read("card-1").await.unwrap(), JPEG);
    }

    #[tokio::test]
    async fn finds_images_saved_with_alternate_extension() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("legacy.jpeg"), JPEG).unwrap();
        let cache = ImageCache::new(dir.path());

        assert_eq!(cache.find("legacy").await, Some(dir.path().join("legacy.jpeg")));
    }

    #[tokio::test]
    async fn resave_in_other_format_replaces_old_file() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path());
        let old = cache.save("pic", JPEG).await.unwrap();
        let new = cache.save("pic", WEBP).await.unwrap();

        assert!(!old.exists());
        assert_eq!(new, dir.path().join("pic.webp"));
        assert_eq!(cache.read("pic").await.unwrap(), WEBP);
    }

    #[tokio::test]
    async fn read_missing_and_invalid_keys_fail() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path());

        assert!(matches!(cache.read("absent").await, Err(CacheError::Io { .. })));
        assert!(matches!(
            cache.save("../up", PNG).await,
            Err(CacheError::InvalidKey(_))
        ));
        assert_eq!(cache.find("../up").await, None);
    }
}
