//! Bounded in-memory caching for expensive computations
//!
//! Provides a small time-boxed cache used to memoize search responses:
//! - Entries expire `ttl` after creation and are evicted lazily on read
//! - Exceeding `max_entries` triggers a sweep of expired entries, then
//!   oldest-first eviction
//! - Keys are hashed with SHA-256 so callers can use arbitrarily long
//!   canonical request strings
//!
//! # Example
//!
//! ```rust
//! use birch_core::cache::{cached, CacheConfig, TtlCache};
//!
//! let cache: TtlCache<u32> = TtlCache::new(CacheConfig::default());
//!
//! let value = cached(&cache, "answer", || 42);
//! assert_eq!(value, 42);
//! assert_eq!(cache.get("answer"), Some(42));
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum age at which an entry is still served
    pub ttl: Duration,
    /// Soft cap on the number of entries
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_entries: 100,
        }
    }
}

/// Cache entry with its creation time
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    created_at: Instant,
    value: V,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.created_at) >= ttl
    }
}

/// Thread-safe in-memory cache with time-to-live expiry.
///
/// Values are cloned out on read; wrap large values in `Arc` if cloning is
/// expensive. A poisoned lock is treated as a miss rather than a panic.
pub struct TtlCache<V> {
    config: CacheConfig,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> TtlCache<V> {
    /// Create a new cache instance
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Configuration this cache was built with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a cached value if present and not stale.
    ///
    /// Stale entries are removed as a side effect.
    pub fn get(&self, key: &str) -> Option<V> {
        let cache_key = hash_key(key);
        let Some(mut guard) = self.lock() else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        let now = Instant::now();
        let fresh = match guard.get(&cache_key) {
            Some(entry) if !entry.is_expired(self.config.ttl, now) => Some(entry.value.clone()),
            Some(_) => {
                guard.remove(&cache_key);
                None
            }
            None => None,
        };

        if fresh.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        fresh
    }

    /// Store a value, replacing any previous entry under the same key
    pub fn insert(&self, key: &str, value: V) {
        let cache_key = hash_key(key);
        let Some(mut guard) = self.lock() else {
            return;
        };

        if !guard.contains_key(&cache_key) && guard.len() >= self.config.max_entries {
            let now = Instant::now();
            let ttl = self.config.ttl;
            let before = guard.len();
            guard.retain(|_, entry| !entry.is_expired(ttl, now));
            tracing::debug!(swept = before - guard.len(), "Cache sweep on insert");

            while !guard.is_empty() && guard.len() >= self.config.max_entries {
                let oldest = guard
                    .iter()
                    .min_by_key(|(_, entry)| entry.created_at)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => {
                        guard.remove(&k);
                    }
                    None => break,
                }
            }
        }

        if self.config.max_entries > 0 {
            guard.insert(
                cache_key,
                CacheEntry {
                    created_at: Instant::now(),
                    value,
                },
            );
        }
    }

    /// Remove a cached value
    pub fn remove(&self, key: &str) -> bool {
        let cache_key = hash_key(key);
        self.lock()
            .is_some_and(|mut guard| guard.remove(&cache_key).is_some())
    }

    /// Clear all cached values
    pub fn clear(&self) {
        if let Some(mut guard) = self.lock() {
            guard.clear();
        }
    }

    /// Clean up expired entries, returning how many were removed
    pub fn cleanup(&self) -> usize {
        let Some(mut guard) = self.lock() else {
            return 0;
        };
        let now = Instant::now();
        let ttl = self.config.ttl;
        let before = guard.len();
        guard.retain(|_, entry| !entry.is_expired(ttl, now));
        before - guard.len()
    }

    /// Number of stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.lock().map_or(0, |guard| guard.len())
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let (total_entries, expired_entries) = self.lock().map_or((0, 0), |guard| {
            let expired = guard
                .values()
                .filter(|entry| entry.is_expired(self.config.ttl, now))
                .count();
            (guard.len(), expired)
        });

        CacheStats {
            total_entries,
            expired_entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            max_entries: self.config.max_entries,
            ttl_secs: self.config.ttl.as_secs(),
        }
    }

    fn lock(&self) -> Option<MutexGuard<'_, HashMap<String, CacheEntry<V>>>> {
        match self.entries.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                tracing::warn!("Cache lock poisoned, bypassing cache");
                None
            }
        }
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Total number of cache entries
    pub total_entries: usize,
    /// Number of entries past their TTL but not yet evicted
    pub expired_entries: usize,
    /// Reads answered from the cache
    pub hits: u64,
    /// Reads that found nothing fresh
    pub misses: u64,
    /// Soft cap on entries
    pub max_entries: usize,
    /// Time-to-live in whole seconds
    pub ttl_secs: u64,
}

/// Compute a value through the cache.
///
/// Concurrent callers racing on the same key may both compute; the last
/// writer wins.
pub fn cached<F, V>(cache: &TtlCache<V>, key: &str, f: F) -> V
where
    F: FnOnce() -> V,
    V: Clone,
{
    if let Some(value) = cache.get(key) {
        return value;
    }

    let value = f();
    cache.insert(key, value.clone());
    value
}

fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cache(ttl: Duration, max_entries: usize) -> TtlCache<String> {
        TtlCache::new(CacheConfig { ttl, max_entries })
    }

    #[test]
    fn test_set_and_get() {
        let cache = test_cache(Duration::from_secs(60), 10);

        cache.insert("test_key", "test_value".to_string());
        assert_eq!(cache.get("test_key"), Some("test_value".to_string()));
    }

    #[test]
    fn test_get_missing() {
        let cache = test_cache(Duration::from_secs(60), 10);
        assert!(cache.get("nonexistent").is_none());
    }

    #[test]
    fn test_remove() {
        let cache = test_cache(Duration::from_secs(60), 10);

        cache.insert("to_remove", "x".to_string());
        assert!(cache.remove("to_remove"));
        assert!(cache.get("to_remove").is_none());
        assert!(!cache.remove("to_remove"));
    }

    #[test]
    fn test_expiry_is_lazy() {
        let cache = test_cache(Duration::from_millis(20), 10);

        cache.insert("expires", "value".to_string());
        assert!(cache.get("expires").is_some());

        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.len(), 1, "Stale entry stays until read");
        assert!(cache.get("expires").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_cap_sweeps_expired_before_insert() {
        let cache = test_cache(Duration::from_millis(20), 2);

        cache.insert("a", "1".to_string());
        cache.insert("b", "2".to_string());
        std::thread::sleep(Duration::from_millis(40));

        cache.insert("c", "3".to_string());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("c"), Some("3".to_string()));
    }

    #[test]
    fn test_cap_evicts_oldest_when_nothing_expired() {
        let cache = test_cache(Duration::from_secs(60), 2);

        cache.insert("a", "1".to_string());
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("b", "2".to_string());
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("c", "3".to_string());

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = test_cache(Duration::from_secs(60), 2);

        cache.insert("a", "1".to_string());
        cache.insert("b", "2".to_string());
        cache.insert("b", "3".to_string());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b"), Some("3".to_string()));
    }

    #[test]
    fn test_clear_and_stats() {
        let cache = test_cache(Duration::from_secs(60), 10);

        cache.insert("key1", "value1".to_string());
        cache.insert("key2", "value2".to_string());
        let _ = cache.get("key1");
        let _ = cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cached_computes_once() {
        let cache: TtlCache<u32> = TtlCache::default();
        let mut calls = 0;

        let first = cached(&cache, "k", || {
            calls += 1;
            7
        });
        let second = cached(&cache, "k", || {
            calls += 1;
            8
        });

        assert_eq!(first, 7);
        assert_eq!(second, 7);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_cleanup_counts_removed() {
        let cache = test_cache(Duration::from_millis(10), 10);
        cache.insert("a", "1".to_string());
        cache.insert("b", "2".to_string());
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.cleanup(), 2);
    }
}
