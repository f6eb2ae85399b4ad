// SPDX-License-Identifier: GPL-3.0-or-later

//! TTL-bounded per-artist tag cache.
//!
//! The cache is a performance optimization, never a correctness
//! requirement: load failures degrade to an empty cache and save failures
//! are swallowed. Persistence is a flat JSON object keyed by artist id.
//! A pre-TTL deployment wrote bare tag arrays; those entries are migrated
//! to the timestamped shape on first read and reported as misses so the
//! caller re-fetches.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tagsift_domain::ArtistId;
use tracing::{debug, warn};

/// Current on-disk entry shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub tags: Vec<String>,
    /// Epoch seconds of the last successful fetch. Monotonically
    /// non-decreasing for a given artist.
    pub fetched_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Current(CacheEntry),
    Legacy(Vec<String>),
}

/// Per-artist canonical-tag cache with a fixed TTL.
#[derive(Debug)]
pub struct TagCache {
    path: PathBuf,
    ttl: Duration,
    entries: HashMap<String, StoredEntry>,
}

impl TagCache {
    /// Load the cache from `path`. Missing or corrupt files degrade to an
    /// empty cache.
    pub fn load(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        let path = path.into();
        let entries = Self::read_entries(&path);
        Self { path, ttl, entries }
    }

    /// An empty, in-memory-only cache (still saveable to `path`).
    pub fn empty(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            entries: HashMap::new(),
        }
    }

    fn read_entries(path: &Path) -> HashMap<String, StoredEntry> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) => {
                debug!(
                    target: "cache",
                    path = %path.display(),
                    error = %error,
                    "cache file not readable, starting empty"
                );
                return HashMap::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(error) => {
                warn!(
                    target: "cache",
                    path = %path.display(),
                    error = %error,
                    "cache file corrupt, starting empty"
                );
                HashMap::new()
            }
        }
    }

    /// Fetch the cached tags for an artist, or `None` on a miss.
    ///
    /// Misses are: no entry, entry older than the TTL, or a legacy-shape
    /// entry. Legacy entries are rewritten in current shape (tags kept,
    /// fresh timestamp) but still count as a miss for this call, so the
    /// caller refreshes them with fetched evidence.
    pub fn get(&mut self, artist_id: &ArtistId, now: DateTime<Utc>) -> Option<Vec<String>> {
        match self.entries.get(artist_id.as_str()) {
            None => None,
            Some(StoredEntry::Legacy(tags)) => {
                let migrated = CacheEntry {
                    tags: tags.clone(),
                    fetched_at: now.timestamp(),
                };
                debug!(
                    target: "cache",
                    artist_id = %artist_id,
                    "migrating legacy cache entry, treating as miss"
                );
                self.entries
                    .insert(artist_id.as_str().to_string(), StoredEntry::Current(migrated));
                None
            }
            Some(StoredEntry::Current(entry)) => {
                let age = now.timestamp() - entry.fetched_at;
                if age > self.ttl.num_seconds() {
                    None
                } else {
                    Some(entry.tags.clone())
                }
            }
        }
    }

    /// Store or refresh an artist's tags. An empty tag list is a valid,
    /// cacheable fact. The stored timestamp never moves backwards.
    pub fn put(&mut self, artist_id: &ArtistId, tags: Vec<String>, now: DateTime<Utc>) {
        let mut fetched_at = now.timestamp();
        if let Some(StoredEntry::Current(existing)) = self.entries.get(artist_id.as_str()) {
            fetched_at = fetched_at.max(existing.fetched_at);
        }

        self.entries.insert(
            artist_id.as_str().to_string(),
            StoredEntry::Current(CacheEntry { tags, fetched_at }),
        );
    }

    /// Number of entries currently held (any shape).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist the cache. Best-effort: failures are logged and swallowed.
    pub fn save(&self) {
        let serialized = match serde_json::to_string_pretty(&self.entries) {
            Ok(serialized) => serialized,
            Err(error) => {
                warn!(target: "cache", error = %error, "failed to serialize cache");
                return;
            }
        };

        if let Err(error) = fs::write(&self.path, serialized) {
            warn!(
                target: "cache",
                path = %self.path.display(),
                error = %error,
                "failed to persist cache"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn ttl() -> Duration {
        Duration::days(14)
    }

    fn at(epoch: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(epoch, 0).unwrap()
    }

    fn artist(id: &str) -> ArtistId {
        ArtistId::new(id)
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let cache = TagCache::load(dir.path().join("nope.json"), ttl());
        assert!(cache.is_empty());
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{not json").unwrap();

        let cache = TagCache::load(&path, ttl());
        assert!(cache.is_empty());
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let mut cache = TagCache::empty(dir.path().join("cache.json"), ttl());
        let now = at(1_700_000_000);

        cache.put(&artist("a1"), vec!["hip-hop".into()], now);
        assert_eq!(cache.get(&artist("a1"), now), Some(vec!["hip-hop".to_string()]));
    }

    #[test]
    fn empty_tag_list_is_a_cacheable_fact() {
        let dir = tempdir().unwrap();
        let mut cache = TagCache::empty(dir.path().join("cache.json"), ttl());
        let now = at(1_700_000_000);

        cache.put(&artist("a1"), vec![], now);
        assert_eq!(cache.get(&artist("a1"), now), Some(vec![]));
    }

    #[test]
    fn entries_expire_strictly_after_ttl() {
        let dir = tempdir().unwrap();
        let mut cache = TagCache::empty(dir.path().join("cache.json"), ttl());
        let fetched = at(1_700_000_000);
        cache.put(&artist("a1"), vec!["rock".into()], fetched);

        let ttl_secs = ttl().num_seconds();
        let just_before = at(1_700_000_000 + ttl_secs - 1);
        let just_after = at(1_700_000_000 + ttl_secs + 1);

        assert_eq!(
            cache.get(&artist("a1"), just_before),
            Some(vec!["rock".to_string()])
        );
        assert_eq!(cache.get(&artist("a1"), just_after), None);
    }

    #[test]
    fn legacy_entry_is_a_miss_and_gets_migrated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, r#"{"a1": ["classical", "baroque"]}"#).unwrap();

        let mut cache = TagCache::load(&path, ttl());
        let now = at(1_700_000_000);

        // first read: miss, but the entry is rewritten in current shape
        assert_eq!(cache.get(&artist("a1"), now), None);
        // second read: the migrated entry is now a hit with preserved tags
        assert_eq!(
            cache.get(&artist("a1"), now),
            Some(vec!["classical".to_string(), "baroque".to_string()])
        );
    }

    #[test]
    fn migrated_legacy_entry_persists_in_current_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, r#"{"a1": ["classical"]}"#).unwrap();

        let mut cache = TagCache::load(&path, ttl());
        let now = at(1_700_000_000);
        cache.get(&artist("a1"), now);
        cache.save();

        let reloaded = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&reloaded).unwrap();
        assert_eq!(parsed["a1"]["tags"][0], "classical");
        assert_eq!(parsed["a1"]["fetched_at"], 1_700_000_000);
    }

    #[test]
    fn timestamps_never_move_backwards() {
        let dir = tempdir().unwrap();
        let mut cache = TagCache::empty(dir.path().join("cache.json"), ttl());

        cache.put(&artist("a1"), vec!["rock".into()], at(2_000));
        // a put with an earlier clock keeps the later timestamp
        cache.put(&artist("a1"), vec!["metal".into()], at(1_000));
        cache.save();

        let raw = fs::read_to_string(dir.path().join("cache.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["a1"]["fetched_at"], 2_000);
        assert_eq!(parsed["a1"]["tags"][0], "metal");
    }

    #[test]
    fn current_format_round_trips_losslessly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = TagCache::empty(&path, ttl());
        let now = at(1_700_000_000);
        cache.put(&artist("a1"), vec!["hip-hop".into(), "rap".into()], now);
        cache.put(&artist("a2"), vec![], now);
        cache.save();

        let mut reloaded = TagCache::load(&path, ttl());
        assert_eq!(
            reloaded.get(&artist("a1"), now),
            Some(vec!["hip-hop".to_string(), "rap".to_string()])
        );
        assert_eq!(reloaded.get(&artist("a2"), now), Some(vec![]));
    }

    #[test]
    fn save_failure_is_swallowed() {
        let dir = tempdir().unwrap();
        // a directory path cannot be written as a file
        let cache = TagCache::empty(dir.path(), ttl());
        cache.save();
    }
}
