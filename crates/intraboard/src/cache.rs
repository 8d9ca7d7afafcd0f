//! On-disk JSON cache for slow-changing API data
//!
//! Cursus project lists and coalition member ids are stored in
//! `~/.cache/intraboard/<key>.json` with a TTL.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Cache expiration duration (7 days)
pub const CACHE_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
struct CachedEntry<T> {
    stored_at: DateTime<Utc>,
    value: T,
}

/// Directory of cached JSON blobs
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    ttl: chrono::Duration,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: chrono::Duration::days(CACHE_TTL_DAYS),
        }
    }

    /// `<cache_dir>/intraboard`
    pub fn default_dir() -> Result<PathBuf> {
        Ok(dirs::cache_dir()
            .context("Could not determine cache directory")?
            .join("intraboard"))
    }

    pub fn with_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }

    /// Cached value for `key`, `None` when absent, expired or unreadable
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let content = std::fs::read_to_string(&path).ok()?;

        let entry: CachedEntry<T> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Ignoring corrupt cache file {}: {}", path.display(), e);
                return None;
            }
        };

        let age = Utc::now().signed_duration_since(entry.stored_at);
        if age > self.ttl {
            tracing::debug!("Cache entry {} expired ({} days old)", key, age.num_days());
            return None;
        }

        tracing::debug!("Cache hit for {}", key);
        Some(entry.value)
    }

    pub fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache directory: {}", self.dir.display()))?;

        let path = self.path_for(key);
        let entry = CachedEntry {
            stored_at: Utc::now(),
            value,
        };
        let json = serde_json::to_string_pretty(&entry).context("Failed to serialize cache entry")?;

        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write cache file: {}", path.display()))
    }

    /// Remove every cached blob, returns how many files were deleted
    pub fn clear(&self) -> Result<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read cache directory: {}", self.dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                removed += 1;
            }
        }

        tracing::info!("Cleared {} cache files", removed);
        Ok(removed)
    }
}
