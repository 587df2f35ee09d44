// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-slot persistence of the last known {username, stats} pair.
//!
//! The record is stored under `<dir>/<namespace>.json` with two scalar
//! string fields: the username and a serialized [`ActivityStats`] blob.
//! Each save replaces the whole record; there is no policy here, the
//! decision of what to show lives in [`crate::services::reconcile`].

use crate::models::ActivityStats;
use crate::time_utils::format_utc_rfc3339;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// On-disk shape of the cache record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CachedSession {
    /// Active username at save time (empty when none)
    #[serde(default)]
    username: String,
    /// JSON of the stats, or "null" when none
    #[serde(rename = "StatsObject", default)]
    stats_object: String,
    /// When this record was written (RFC 3339)
    #[serde(default)]
    saved_at: String,
}

#[derive(Debug)]
enum Backend {
    File { path: PathBuf },
    Memory(Mutex<Option<CachedSession>>),
}

/// Persisted last-known session record.
#[derive(Debug)]
pub struct SessionCache {
    backend: Backend,
}

impl SessionCache {
    /// Open a file-backed cache for `namespace` inside `dir`.
    ///
    /// The directory is created on first save, not here.
    pub fn open<P: AsRef<Path>>(dir: P, namespace: &str) -> Self {
        let path = dir.as_ref().join(format!("{}.json", namespace));
        Self {
            backend: Backend::File { path },
        }
    }

    /// Create a cache that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Mutex::new(None)),
        }
    }

    /// Persist `username` and `stats` together as one record.
    ///
    /// File-backed caches write a sibling temp file and rename it over the
    /// record, so a reader sees either the old pair or the new pair.
    pub fn save(
        &self,
        username: Option<&str>,
        stats: Option<&ActivityStats>,
    ) -> Result<(), CacheError> {
        let record = CachedSession {
            username: username.unwrap_or_default().to_string(),
            stats_object: serde_json::to_string(&stats)
                .map_err(|e| CacheError::Encode(e.to_string()))?,
            saved_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        tracing::debug!(
            username = %record.username,
            has_stats = stats.is_some(),
            "Saving session cache"
        );

        match &self.backend {
            Backend::File { path } => write_atomic(path, &record),
            Backend::Memory(slot) => {
                *slot.lock().map_err(|_| CacheError::Poisoned)? = Some(record);
                Ok(())
            }
        }
    }

    /// Return the last saved record, or `(None, None)` if nothing was saved.
    ///
    /// An empty username is reported as `None`. A stats blob that does not
    /// decode is dropped (the username is still returned).
    pub fn load(&self) -> Result<(Option<String>, Option<ActivityStats>), CacheError> {
        let record = match &self.backend {
            Backend::File { path } => read_record(path)?,
            Backend::Memory(slot) => slot.lock().map_err(|_| CacheError::Poisoned)?.clone(),
        };

        let Some(record) = record else {
            return Ok((None, None));
        };

        let stats = if record.stats_object.is_empty() {
            None
        } else {
            match serde_json::from_str::<Option<ActivityStats>>(&record.stats_object) {
                Ok(stats) => stats,
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding undecodable cached stats");
                    None
                }
            }
        };

        let username = Some(record.username).filter(|u| !u.is_empty());
        Ok((username, stats))
    }

    /// Location of the record file, if file-backed.
    pub fn path(&self) -> Option<&Path> {
        match &self.backend {
            Backend::File { path } => Some(path),
            Backend::Memory(_) => None,
        }
    }
}

fn read_record(path: &Path) -> Result<Option<CachedSession>, CacheError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CacheError::Io(e.to_string())),
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|e| CacheError::Corrupt(e.to_string()))
}

fn write_atomic(path: &Path, record: &CachedSession) -> Result<(), CacheError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| CacheError::Io(e.to_string()))?;
    }
    let json = serde_json::to_vec(record).map_err(|e| CacheError::Encode(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| CacheError::Io(e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        CacheError::Io(e.to_string())
    })
}

/// Errors from session cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to access cache file: {0}")]
    Io(String),

    #[error("Cache record is corrupt: {0}")]
    Corrupt(String),

    #[error("Failed to encode cache record: {0}")]
    Encode(String),

    #[error("Cache lock poisoned")]
    Poisoned,
}
