//! In-memory TTL cache shared by the aggregator.
//!
//! Keys are `namespace:arg1:arg2...`. Each write picks its lifetime from a
//! fixed [`CacheTtl`] category. An entry is present while
//! `now - timestamp < ttl`; expired entries are dropped on the read that finds
//! them and by the periodic sweep started with [`TtlCache::spawn_sweeper`].
//!
//! There is no single-flight: two concurrent misses on the same key both
//! compute and both write, the later write wins.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info};

/// Default period of the background sweep
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;

/// Lifetime categories. Durations are fixed per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTtl {
    Repos,
    RepoDetails,
    Commits,
    CommitActivity,
    CodeFrequency,
    Tree,
    FileContent,
    Issues,
    PullRequests,
    Releases,
    Languages,
}

impl CacheTtl {
    pub fn duration(self) -> Duration {
        let secs = match self {
            CacheTtl::Repos => HOUR,
            CacheTtl::RepoDetails => 30 * MINUTE,
            CacheTtl::Commits => 30 * MINUTE,
            CacheTtl::CommitActivity => 2 * HOUR,
            CacheTtl::CodeFrequency => 2 * HOUR,
            CacheTtl::Tree => HOUR,
            CacheTtl::FileContent => 30 * MINUTE,
            CacheTtl::Issues => 15 * MINUTE,
            CacheTtl::PullRequests => 15 * MINUTE,
            CacheTtl::Releases => HOUR,
            CacheTtl::Languages => HOUR,
        };
        Duration::from_secs(secs)
    }
}

/// A stored value. Never mutated after insertion; a write replaces it whole.
struct CacheEntry {
    data: Arc<dyn Any + Send + Sync>,
    timestamp: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.timestamp) >= self.ttl
    }
}

/// Snapshot of cache occupancy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Resident entries, including expired ones not yet swept
    pub size: usize,
    pub keys: Vec<String>,
}

/// Build the key for a namespace and its ordered arguments.
pub fn cache_key(namespace: &str, args: &[&str]) -> String {
    format!("{}:{}", namespace, args.join(":"))
}

/// Keyed store with per-category expiry.
#[derive(Default)]
pub struct TtlCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a live entry. Returns `None` when absent, expired, or stored
    /// under a different type. Expired entries are evicted here.
    pub fn get<T>(&self, namespace: &str, args: &[&str]) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let key = cache_key(namespace, args);
        let now = Instant::now();

        {
            let entries = self.read();
            match entries.get(&key) {
                None => {
                    debug!(key = %key, "Cache miss");
                    return None;
                }
                Some(entry) if !entry.is_expired(now) => {
                    debug!(key = %key, "Cache hit");
                    return entry.data.downcast_ref::<T>().cloned();
                }
                Some(_) => {}
            }
        }

        let mut entries = self.write();
        if entries.get(&key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(&key);
            debug!(key = %key, "Evicted expired entry");
        }
        None
    }

    /// Store a value, replacing anything under the same key.
    pub fn set<T>(&self, namespace: &str, ttl: CacheTtl, data: T, args: &[&str])
    where
        T: Send + Sync + 'static,
    {
        let key = cache_key(namespace, args);
        let entry = CacheEntry {
            data: Arc::new(data),
            timestamp: Instant::now(),
            ttl: ttl.duration(),
        };
        self.write().insert(key, entry);
    }

    /// Remove one entry. Returns whether it was resident.
    pub fn invalidate(&self, namespace: &str, args: &[&str]) -> bool {
        self.write().remove(&cache_key(namespace, args)).is_some()
    }

    /// Remove every entry whose key starts with `prefix`.
    pub fn invalidate_pattern(&self, prefix: &str) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.read();
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: entries.len(),
            keys,
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Run [`purge_expired`](Self::purge_expired) every `period` until the
    /// returned handle is aborted.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        info!(period_secs = period.as_secs(), "Starting cache sweeper");

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let removed = cache.purge_expired();
                if removed > 0 {
                    info!(removed = removed, "Swept expired cache entries");
                }
            }
        })
    }
}
