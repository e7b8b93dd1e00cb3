//! Decides whether a persisted record list may be reused.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing::debug;

use crate::record::{records_from_value, RecordSet};

/// Outcome of a staleness check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheCheck {
    /// True unless the content can be served as-is.
    pub stale: bool,
    /// Cached records; empty whenever `stale` is true.
    pub records: RecordSet,
}

impl CacheCheck {
    fn stale() -> Self {
        Self {
            stale: true,
            records: RecordSet::new(),
        }
    }
}

/// Checks `path` against `max_age` using the current time.
#[must_use]
pub fn check_local_cache(path: &Path, max_age: Duration) -> CacheCheck {
    check_local_cache_at(path, max_age, SystemTime::now())
}

/// Checks `path` against `max_age` as of `now`.
///
/// Usable only if the file exists, is non-empty, parses to a non-empty JSON
/// array of objects, and is strictly younger than `max_age`. Every failure
/// reads as stale.
#[must_use]
pub fn check_local_cache_at(path: &Path, max_age: Duration, now: SystemTime) -> CacheCheck {
    let Ok(metadata) = fs::metadata(path) else {
        return CacheCheck::stale();
    };
    if metadata.len() == 0 {
        return CacheCheck::stale();
    }

    // A modification time in the future counts as brand new.
    let age = metadata
        .modified()
        .ok()
        .map(|modified| now.duration_since(modified).unwrap_or(Duration::ZERO));
    let Some(age) = age else {
        return CacheCheck::stale();
    };
    if age >= max_age {
        debug!(path = %path.display(), age_secs = age.as_secs(), "Cache file expired");
        return CacheCheck::stale();
    }

    match load_records(path) {
        Some(records) if !records.is_empty() => CacheCheck {
            stale: false,
            records,
        },
        _ => CacheCheck::stale(),
    }
}

/// Reads a content file leniently: unreadable or malformed input yields `None`.
pub(crate) fn load_records(path: &Path) -> Option<RecordSet> {
    let bytes = fs::read(path).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => records_from_value(value),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Ignoring malformed cache file");
            None
        }
    }
}

/// Age of the file at `path`, if it exists.
pub(crate) fn file_age(path: &Path, now: SystemTime) -> Option<Duration> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(now.duration_since(modified).unwrap_or(Duration::ZERO))
}
