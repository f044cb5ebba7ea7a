//! Helpers shared by the directory-backed caches.

use std::path::Path;
use std::time::{Duration, SystemTime};

use tokio::fs;
use tracing::{debug, warn};

use super::error::{CacheError, CacheResult};

/// Outcome of a purge pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Files deleted for exceeding the age threshold.
    pub removed: usize,
    /// Files young enough to keep.
    pub kept: usize,
    /// Files that could not be inspected or deleted.
    pub failed: usize,
}

impl PurgeReport {
    /// Sum two reports, e.g. for a purge spanning several caches.
    pub fn merge(self, other: PurgeReport) -> PurgeReport {
        PurgeReport {
            removed: self.removed + other.removed,
            kept: self.kept + other.kept,
            failed: self.failed + other.failed,
        }
    }
}

/// Keys become file names, so they must stay inside the cache directory.
pub(super) fn validate_key(key: &str) -> CacheResult<()> {
    let invalid = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\'])
        || key.contains('\0');
    if invalid {
        return Err(CacheError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Delete every regular file in `dir` last modified more than `max_age` ago.
pub(super) async fn purge_dir(dir: &Path, max_age: Duration) -> PurgeReport {
    let mut report = PurgeReport::default();

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Error clearing cache {}: {}", dir.display(), e);
            return report;
        }
    };

    let now = SystemTime::now();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Error listing cache {}: {}", dir.display(), e);
                report.failed += 1;
                break;
            }
        };

        let path = entry.path();
        let modified = match entry.metadata().await.and_then(|m| {
            if m.is_file() {
                m.modified().map(Some)
            } else {
                Ok(None)
            }
        }) {
            Ok(Some(modified)) => modified,
            Ok(None) => continue,
            Err(e) => {
                warn!("Cannot stat {}: {}", path.display(), e);
                report.failed += 1;
                continue;
            }
        };

        // Clock skew can put mtime in the future; treat that as fresh.
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age <= max_age {
            report.kept += 1;
            continue;
        }

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Purged stale file {}", path.display());
                report.removed += 1;
            }
            Err(e) => {
                warn!("Failed to purge {}: {}", path.display(), e);
                report.failed += 1;
            }
        }
    }

    report
}
