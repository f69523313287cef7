// SPDX-License-Identifier: MIT

//! Keyed TTL cache persisted as a JSON snapshot on local disk.
//!
//! Directory lookups are slow, so results are kept for a day. The store
//! carries a schema-version marker: when the running version no longer
//! matches the marker, every entry is dropped on open. A corrupt or
//! unreadable snapshot is never fatal — the store starts empty and the
//! affected lookups fall through to live resolution.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Entries older than this are treated as misses.
pub const CACHE_TTL_SECS: u64 = 86_400;

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    ts: u64,
    value: serde_json::Value,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    version: String,
    entries: HashMap<String, Entry>,
}

/// Durable keyed store mapping cache keys to `(timestamp, value)` pairs.
///
/// Lifecycle: open once at startup, read/write during the run, `flush`
/// before exit. Opening with `enabled = false` bypasses every read for
/// the run (explicit cache-busting); writes still land so the snapshot
/// is warm for the next run.
pub struct CacheStore {
    path: PathBuf,
    snapshot: Snapshot,
    enabled: bool,
}

impl CacheStore {
    pub fn open(path: impl Into<PathBuf>, version: &str, enabled: bool) -> Self {
        let path = path.into();
        let mut snapshot = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Snapshot>(&bytes) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cache snapshot unreadable, starting empty");
                    Snapshot::default()
                }
            },
            Err(_) => Snapshot::default(),
        };

        if snapshot.version != version {
            debug!(
                stored = %snapshot.version,
                running = %version,
                "cache schema version changed, invalidating store"
            );
            snapshot.entries.clear();
            snapshot.version = version.to_string();
        }

        Self {
            path,
            snapshot,
            enabled,
        }
    }

    /// Miss when the key is absent, the entry has outlived the TTL,
    /// caching is disabled for this run, or the stored value no longer
    /// deserializes as `T` (a stale shape is as useless as no entry).
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, unix_now())
    }

    fn get_at<T: DeserializeOwned>(&self, key: &str, now: u64) -> Option<T> {
        if !self.enabled {
            return None;
        }
        let entry = self.snapshot.entries.get(key)?;
        if now >= entry.ts + CACHE_TTL_SECS {
            debug!(key, "cache entry expired");
            return None;
        }
        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "cache entry has a stale shape, ignoring");
                None
            }
        }
    }

    /// Always overwrites, stamped with the current time.
    pub fn put<T: Serialize>(&mut self, key: &str, value: &T) {
        self.put_at(key, value, unix_now());
    }

    fn put_at<T: Serialize>(&mut self, key: &str, value: &T, now: u64) {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.snapshot
                    .entries
                    .insert(key.to_string(), Entry { ts: now, value });
            }
            Err(e) => warn!(key, error = %e, "value not serializable, skipping cache write"),
        }
    }

    pub fn invalidate_all(&mut self) {
        self.snapshot.entries.clear();
    }

    /// Persists the snapshot durably. Written to a sibling temp file and
    /// renamed into place so a crash mid-write cannot corrupt the store.
    pub fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating cache dir {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("tmp");
        let bytes = serde_json::to_vec(&self.snapshot).context("serializing cache snapshot")?;
        fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn entries_expire_exactly_at_ttl() {
        let dir = tempdir().unwrap();
        let mut store = CacheStore::open(dir.path().join("cache.json"), "1", true);
        store.put_at("k", &"v".to_string(), 1_000);

        let hit: Option<String> = store.get_at("k", 1_000 + CACHE_TTL_SECS - 1);
        assert_eq!(hit.as_deref(), Some("v"));

        let miss: Option<String> = store.get_at("k", 1_000 + CACHE_TTL_SECS);
        assert!(miss.is_none());
    }

    #[test]
    fn version_bump_invalidates_everything() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut store = CacheStore::open(&path, "1", true);
        store.put("k", &42u32);
        store.flush().unwrap();

        let store = CacheStore::open(&path, "2", true);
        let miss: Option<u32> = store.get("k");
        assert!(miss.is_none());
    }

    #[test]
    fn version_marker_is_rewritten_after_invalidation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        CacheStore::open(&path, "2", true).flush().unwrap();

        // Re-opening under the same version must not invalidate again.
        let mut store = CacheStore::open(&path, "2", true);
        store.put("k", &1u32);
        store.flush().unwrap();
        let store = CacheStore::open(&path, "2", true);
        assert_eq!(store.get::<u32>("k"), Some(1));
    }

    #[test]
    fn snapshot_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut store = CacheStore::open(&path, "1", true);
        store.put("instances", &vec!["a".to_string(), "b".to_string()]);
        store.flush().unwrap();

        let store = CacheStore::open(&path, "1", true);
        assert_eq!(
            store.get::<Vec<String>>("instances"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn corrupt_snapshot_is_an_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, b"{ not json").unwrap();

        let mut store = CacheStore::open(&path, "1", true);
        assert!(store.get::<u32>("k").is_none());

        // And it recovers: writes land and flush normally.
        store.put("k", &7u32);
        store.flush().unwrap();
        assert_eq!(CacheStore::open(&path, "1", true).get::<u32>("k"), Some(7));
    }

    #[test]
    fn disabled_store_misses_but_still_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut store = CacheStore::open(&path, "1", false);
        store.put("k", &1u32);
        assert!(store.get::<u32>("k").is_none());
        store.flush().unwrap();

        // The write is visible to the next (enabled) run.
        assert_eq!(CacheStore::open(&path, "1", true).get::<u32>("k"), Some(1));
    }

    #[test]
    fn put_overwrites_with_fresh_timestamp() {
        let dir = tempdir().unwrap();
        let mut store = CacheStore::open(dir.path().join("cache.json"), "1", true);
        store.put_at("k", &1u32, 1_000);
        store.put_at("k", &2u32, 2_000);

        // Old timestamp no longer applies.
        let hit: Option<u32> = store.get_at("k", 1_000 + CACHE_TTL_SECS + 1);
        assert_eq!(hit, Some(2));
    }

    #[test]
    fn invalidate_all_clears_entries() {
        let dir = tempdir().unwrap();
        let mut store = CacheStore::open(dir.path().join("cache.json"), "1", true);
        store.put("a", &1u32);
        store.put("b", &2u32);
        store.invalidate_all();
        assert!(store.get::<u32>("a").is_none());
        assert!(store.get::<u32>("b").is_none());
    }
}
