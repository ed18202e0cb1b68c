//! LRU Cache Module
//!
//! Capacity-bounded cache with a per-entry TTL. A hash index maps each key to
//! its node in a [`RecencyList`], so get, set and eviction are all O(1).
//!
//! One `RwLock` guards the index and the list together. `get` moves the hit
//! to the front, so it takes the lock exclusively; only the non-promoting
//! reads (`peek`, `contains`, `len`, `keys`) share it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::cache::entry::{current_timestamp_nanos, deadline_after};
use crate::cache::{CacheStats, RecencyList, StatsRecorder};
use crate::config::LruCacheConfig;
use crate::error::Result;
use crate::tasks::Janitor;

// == Cache Item ==
#[derive(Debug)]
struct CacheItem<V> {
    key: String,
    value: V,
    /// Expiration timestamp (Unix nanoseconds)
    expires_at: u64,
}

impl<V> CacheItem<V> {
    fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at
    }
}

// == LRU State ==
/// Index and recency list, always updated together under one lock.
#[derive(Debug)]
struct LruState<V> {
    index: HashMap<String, usize>,
    list: RecencyList<CacheItem<V>>,
}

impl<V: Clone> LruState<V> {
    fn new(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            list: RecencyList::with_capacity(capacity),
        }
    }

    fn get(&mut self, key: &str, now: u64) -> Option<V> {
        let index = *self.index.get(key)?;
        let item = self.list.get(index)?;
        if item.is_expired_at(now) {
            // Left in place for the GC task
            return None;
        }
        let value = item.value.clone();
        self.list.move_to_front(index);
        Some(value)
    }

    fn peek(&self, key: &str, now: u64) -> Option<&V> {
        let index = *self.index.get(key)?;
        self.list
            .get(index)
            .filter(|item| !item.is_expired_at(now))
            .map(|item| &item.value)
    }

    /// Inserts or refreshes `key`, returning the evicted item if capacity overflowed.
    fn set(
        &mut self,
        key: String,
        value: V,
        expires_at: u64,
        capacity: usize,
    ) -> Option<CacheItem<V>> {
        if let Some(index) = self.index.get(&key).copied() {
            if let Some(item) = self.list.get_mut(index) {
                item.value = value;
                item.expires_at = expires_at;
            }
            self.list.move_to_front(index);
            return None;
        }

        let index = self.list.push_front(CacheItem {
            key: key.clone(),
            value,
            expires_at,
        });
        self.index.insert(key, index);

        if self.list.len() > capacity {
            self.evict_oldest()
        } else {
            None
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheItem<V>> {
        let index = self.index.remove(key)?;
        self.list.remove(index)
    }

    fn evict_oldest(&mut self) -> Option<CacheItem<V>> {
        let item = self.list.pop_back()?;
        self.index.remove(&item.key);
        Some(item)
    }

    /// Removes every item expired at `now`, index first, then list.
    fn purge_expired(&mut self, now: u64) -> usize {
        let expired: Vec<(usize, String)> = self
            .list
            .iter()
            .filter(|(_, item)| item.is_expired_at(now))
            .map(|(index, item)| (index, item.key.clone()))
            .collect();

        for (index, key) in &expired {
            self.index.remove(key);
            self.list.remove(*index);
        }
        expired.len()
    }

    fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
    }
}

// == LRU Core ==
/// State shared between the cache handle and its GC task.
struct LruCore<V> {
    state: RwLock<LruState<V>>,
    capacity: usize,
    ttl: Duration,
    stats: StatsRecorder,
}

impl<V: Clone> LruCore<V> {
    fn gc(&self) -> usize {
        let removed = self.state.write().purge_expired(current_timestamp_nanos());
        self.stats.record_expired(removed);
        removed
    }
}

// == LRU Cache ==
/// Bounded least-recently-used cache with per-entry expiration.
///
/// When a GC interval is configured, a background task removes expired
/// entries until [`LruCache::close`] is called or the cache is dropped.
pub struct LruCache<V> {
    core: Arc<LruCore<V>>,
    gc_task: Mutex<Option<Janitor>>,
}

impl<V> LruCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// A zero `gc_interval` starts no GC task; expired entries then stay until
    /// they are evicted, deleted or removed by [`LruCache::gc`].
    ///
    /// # Errors
    /// - [`CacheError::InvalidConfig`](crate::error::CacheError::InvalidConfig)
    ///   for a zero capacity or ttl
    /// - [`CacheError::RuntimeUnavailable`](crate::error::CacheError::RuntimeUnavailable)
    ///   if a GC task is requested outside a tokio runtime
    pub fn new(config: LruCacheConfig) -> Result<Self> {
        config.validate()?;

        let core = Arc::new(LruCore {
            state: RwLock::new(LruState::new(config.capacity)),
            capacity: config.capacity,
            ttl: config.ttl,
            stats: StatsRecorder::new(),
        });

        let gc_task = if config.gc_interval.is_zero() {
            None
        } else {
            let weak = Arc::downgrade(&core);
            Some(Janitor::spawn("lru gc", config.gc_interval, move || {
                weak.upgrade().map(|core| core.gc())
            })?)
        };

        Ok(Self {
            core,
            gc_task: Mutex::new(gc_task),
        })
    }

    // == Get ==
    /// Returns the value for `key` if present and not expired, marking it most
    /// recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = current_timestamp_nanos();
        let value = self.core.state.write().get(key, now);
        self.core.stats.record_lookup(value.is_some());
        value
    }

    /// Returns the value for `key` without changing its recency.
    pub fn peek(&self, key: &str) -> Option<V> {
        let now = current_timestamp_nanos();
        self.core.state.read().peek(key, now).cloned()
    }

    /// Returns true if `key` is present and not expired. Does not change recency.
    pub fn contains(&self, key: &str) -> bool {
        let now = current_timestamp_nanos();
        self.core.state.read().peek(key, now).is_some()
    }

    // == Set ==
    /// Stores `value` under `key` with a fresh TTL and marks it most recently
    /// used. Inserting a new key into a full cache evicts the least recently
    /// used entry, expired or not.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let expires_at = deadline_after(current_timestamp_nanos(), self.core.ttl);
        let evicted = self
            .core
            .state
            .write()
            .set(key.into(), value, expires_at, self.core.capacity);

        if let Some(evicted) = evicted {
            self.core.stats.record_eviction();
            debug!(key = %evicted.key, "Evicted least recently used entry");
        }
    }

    // == Delete ==
    /// Removes `key`. Does nothing if it is absent.
    pub fn delete(&self, key: &str) {
        self.core.state.write().remove(key);
    }

    // == GC ==
    /// Removes every expired entry now and returns how many were removed.
    pub fn gc(&self) -> usize {
        self.core.gc()
    }

    /// Removes all entries.
    pub fn flush(&self) {
        self.core.state.write().clear();
    }

    // == Introspection ==
    /// Number of stored entries, including expired ones not yet collected.
    pub fn len(&self) -> usize {
        self.core.state.read().list.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        self.core
            .state
            .read()
            .list
            .iter()
            .map(|(_, item)| item.key.clone())
            .collect()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.core.capacity
    }

    /// Lifetime given to each entry on `set`.
    pub fn ttl(&self) -> Duration {
        self.core.ttl
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.core.stats.snapshot(self.len())
    }

    /// Returns true while a GC task is attached.
    pub fn has_gc_task(&self) -> bool {
        self.gc_task.lock().is_some()
    }

    // == Close ==
    /// Stops the GC task, if any. Safe to call more than once; dropping the
    /// cache does the same.
    pub fn close(&self) {
        if let Some(mut task) = self.gc_task.lock().take() {
            task.stop();
        }
    }
}
