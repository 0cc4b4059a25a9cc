//! Persistent analytics cache
//!
//! One JSON blob on disk, read into memory once at startup and flushed
//! back on every mutation. A single instance is shared by every consumer
//! view, so all writes go through the same in-memory map and the blob is
//! always written from the freshest state.
//!
//! Cache I/O is never fatal: an unreadable blob starts the cache cold, a
//! failed flush keeps serving from memory and retries on the next write.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tokio::sync::RwLock;

use shared::{CacheEntry, NormalizedAnalytics};

/// Keyed, persistent, cross-view cache of normalized analytics
pub struct AnalyticsCache {
    path: PathBuf,
    ttl: Option<Duration>,
    data: RwLock<HashMap<String, CacheEntry>>,
}

impl AnalyticsCache {
    /// Open the cache at `path`, loading whatever blob is already there.
    pub fn open(path: impl Into<PathBuf>, ttl: Option<Duration>) -> Self {
        let path = path.into();
        let data = match load_blob(&path) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("Cache load failed, starting cold: {:#}", e);
                HashMap::new()
            }
        };

        Self {
            path,
            ttl,
            data: RwLock::new(data),
        }
    }

    /// Entry at `key`, if present and fresh. Without a configured TTL a
    /// hit is served no matter how old it is.
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        let entry = self.data.read().await.get(key).cloned()?;
        self.is_fresh(&entry).then_some(entry)
    }

    /// Insert (or overwrite) and flush. Returns the stamped entry.
    pub async fn put(&self, key: String, response: NormalizedAnalytics) -> CacheEntry {
        let entry = CacheEntry {
            key: key.clone(),
            cached_at_epoch_seconds: Utc::now().timestamp(),
            response,
        };

        let mut guard = self.data.write().await;
        guard.insert(key, entry.clone());
        if let Err(e) = self.persist(&guard) {
            tracing::warn!("Cache persist failed, keeping entry in memory: {:#}", e);
        }
        entry
    }

    /// Number of entries currently held, fresh or not.
    pub async fn entry_count(&self) -> usize {
        self.data.read().await.len()
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        match self.ttl {
            None => true,
            Some(ttl) => {
                let age = Utc::now().timestamp() - entry.cached_at_epoch_seconds;
                age <= ttl.as_secs() as i64
            }
        }
    }

    /// Serialize to a sibling temp file, then rename over the blob so a
    /// crash mid-write can never leave a torn store behind.
    fn persist(&self, data: &HashMap<String, CacheEntry>) -> anyhow::Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serialized)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

fn load_blob(path: &Path) -> anyhow::Result<HashMap<String, CacheEntry>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read cache blob {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse cache blob {}", path.display()))
}
