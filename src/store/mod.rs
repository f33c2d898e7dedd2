//! Keyed persistence for time-series snapshots with freshness metadata.
//!
//! Backed by a fjall keyspace at an injected directory, so isolated
//! instances (tests, concurrent sessions) never interfere. Every write
//! is atomic at the key level; reads observe either the prior or the
//! new value, never a torn one. Reads never touch the network and
//! treat any I/O or decode error as a miss; writes are best-effort.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// A cached snapshot plus its capture timestamp and source tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub captured_at: DateTime<Utc>,
    pub source: String,
    pub value: T,
}

impl<T> CacheEntry<T> {
    pub fn new(source: &str, value: T) -> Self {
        CacheEntry {
            captured_at: Utc::now(),
            source: source.to_string(),
            value,
        }
    }

    /// `None` max age means the entry never expires (used for FX, whose
    /// historical rates are immutable once captured).
    pub fn is_fresh(&self, max_age: Option<Duration>) -> bool {
        match max_age {
            None => true,
            Some(age) => Utc::now() - self.captured_at <= age,
        }
    }
}

/// Summary of one cache key, for `cache status`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheKeyStatus {
    pub key: String,
    pub captured_at: DateTime<Utc>,
    pub source: String,
    pub size_bytes: usize,
}

pub struct CacheStore {
    _keyspace: Keyspace,
    partition: PartitionHandle,
}

impl CacheStore {
    /// Opens (or creates) the store under `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        let keyspace = fjall::Config::new(dir)
            .open()
            .with_context(|| format!("Failed to open cache store at {}", dir.display()))?;
        let partition = keyspace
            .open_partition("snapshots", PartitionCreateOptions::default())
            .context("Failed to open cache partition")?;
        Ok(CacheStore {
            _keyspace: keyspace,
            partition,
        })
    }

    /// Pure read; any failure is a miss so callers fall through.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        match self.partition.get(key) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(entry) => {
                    debug!(key, "Cache HIT");
                    Some(entry)
                }
                Err(e) => {
                    debug!(key, error = %e, "Discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => {
                debug!(key, "Cache MISS");
                None
            }
            Err(e) => {
                debug!(key, error = %e, "Cache read failed; treating as miss");
                None
            }
        }
    }

    /// Best-effort write: failures are logged, never surfaced.
    pub fn put<T: Serialize>(&self, key: &str, entry: &CacheEntry<T>) {
        let result: Result<()> = serde_json::to_vec(entry)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| {
                self.partition.insert(key, bytes)?;
                Ok(())
            });
        match result {
            Ok(()) => debug!(key, "Cache PUT"),
            Err(e) => warn!(key, error = %e, "Failed to write cache entry"),
        }
    }

    /// Metadata for every stored key.
    pub fn status(&self) -> Vec<CacheKeyStatus> {
        #[derive(Deserialize)]
        struct Header {
            captured_at: DateTime<Utc>,
            source: String,
        }

        let mut entries = Vec::new();
        for kv in self.partition.iter() {
            let Ok((key, value)) = kv else { continue };
            let Ok(key) = std::str::from_utf8(&key) else {
                continue;
            };
            if let Ok(header) = serde_json::from_slice::<Header>(&value) {
                entries.push(CacheKeyStatus {
                    key: key.to_string(),
                    captured_at: header.captured_at,
                    source: header.source,
                    size_bytes: value.len(),
                });
            }
        }
        entries
    }

    /// Removes every entry. Returns the number of keys deleted.
    pub fn clear(&self) -> Result<usize> {
        let keys: Vec<_> = self
            .partition
            .keys()
            .collect::<std::result::Result<_, _>>()
            .context("Failed to enumerate cache keys")?;
        for key in &keys {
            self.partition.remove(key.clone())?;
        }
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        rate: f64,
    }

    #[test]
    fn test_get_put_roundtrip() {
        let dir = tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        assert!(store.get::<Snapshot>("fx/2023-03-31/USD/EUR").is_none());

        let entry = CacheEntry::new("fresh-api", Snapshot { rate: 0.92 });
        store.put("fx/2023-03-31/USD/EUR", &entry);

        let loaded = store.get::<Snapshot>("fx/2023-03-31/USD/EUR").unwrap();
        assert_eq!(loaded.value, Snapshot { rate: 0.92 });
        assert_eq!(loaded.source, "fresh-api");
    }

    #[test]
    fn test_overwrite_advances_timestamp() {
        let dir = tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        let first = CacheEntry::new("fresh-api", Snapshot { rate: 1.0 });
        store.put("k", &first);
        let second = CacheEntry::new("fresh-api", Snapshot { rate: 2.0 });
        store.put("k", &second);

        let loaded = store.get::<Snapshot>("k").unwrap();
        assert_eq!(loaded.value.rate, 2.0);
        assert!(loaded.captured_at >= first.captured_at);
    }

    #[test]
    fn test_freshness_thresholds() {
        let mut entry = CacheEntry::new("fresh-api", Snapshot { rate: 1.0 });

        entry.captured_at = Utc::now() - Duration::days(29);
        assert!(entry.is_fresh(Some(Duration::days(30))));

        entry.captured_at = Utc::now() - Duration::days(31);
        assert!(!entry.is_fresh(Some(Duration::days(30))));

        // Infinite max age: any timestamp is fresh.
        entry.captured_at = Utc::now() - Duration::days(365 * 10);
        assert!(entry.is_fresh(None));
    }

    #[test]
    fn test_undecodable_entry_is_a_miss() {
        #[derive(Serialize, Deserialize)]
        struct Other {
            name: String,
        }

        let dir = tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();
        store.put("k", &CacheEntry::new("fresh-api", Other { name: "x".into() }));
        assert!(store.get::<Snapshot>("k").is_none());
    }

    #[test]
    fn test_status_and_clear() {
        let dir = tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        store.put("a", &CacheEntry::new("fresh-api", Snapshot { rate: 1.0 }));
        store.put("b", &CacheEntry::new("bundled", Snapshot { rate: 2.0 }));

        let status = store.status();
        assert_eq!(status.len(), 2);
        assert!(status.iter().any(|s| s.key == "a"));
        assert!(status.iter().any(|s| s.source == "bundled"));

        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.status().is_empty());
    }

    #[test]
    fn test_isolated_instances_do_not_interfere() {
        let dir_a = tempdir().unwrap();
        let dir_b = tempdir().unwrap();
        let store_a = CacheStore::open(dir_a.path()).unwrap();
        let store_b = CacheStore::open(dir_b.path()).unwrap();

        store_a.put("k", &CacheEntry::new("fresh-api", Snapshot { rate: 1.0 }));
        assert!(store_b.get::<Snapshot>("k").is_none());
    }
}
