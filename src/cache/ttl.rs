//! TTL Cache Module
//!
//! Expiring key-value cache over a pluggable [`StorageBackend`]. Expiration is
//! lazy: `get` hides expired entries but leaves them in place, and a sweep
//! (manual or from the janitor) removes them.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::cache::entry::current_timestamp_nanos;
use crate::cache::{BackendKind, CacheStats, Entry, Expiration, StatsRecorder, StorageBackend};
use crate::config::TtlCacheConfig;
use crate::error::Result;
use crate::tasks::Janitor;

// == TTL Core ==
/// State shared between the cache handle and its janitor.
struct TtlCore<V, B> {
    backend: B,
    default_expiration: Option<Duration>,
    stats: StatsRecorder,
    _value: PhantomData<fn() -> V>,
}

impl<V, B> TtlCore<V, B>
where
    B: StorageBackend<V>,
{
    /// Removes every entry expired as of one clock reading.
    ///
    /// Keys are collected first and removed with a re-check, so an entry
    /// rewritten between the scan and the removal survives.
    fn sweep(&self) -> usize {
        let now = current_timestamp_nanos();
        let mut expired = Vec::new();
        self.backend.for_each(&mut |key, entry| {
            if entry.is_expired_at(now) {
                expired.push(key.to_string());
            }
        });

        let removed = expired
            .iter()
            .filter(|key| {
                self.backend
                    .remove_if(key.as_str(), &|entry| entry.is_expired_at(now))
            })
            .count();
        self.stats.record_expired(removed);
        removed
    }
}

// == TTL Cache ==
/// Expiring cache whose storage strategy is chosen at construction.
///
/// Values are stored as given and handed back as clones; store an `Arc` (or
/// another cheap handle) to share one object between the cache and callers.
///
/// If a sweep interval is configured, a janitor task runs until [`TtlCache::close`]
/// is called or the cache is dropped.
pub struct TtlCache<V, B = Box<dyn StorageBackend<V>>> {
    core: Arc<TtlCore<V, B>>,
    janitor: Mutex<Option<Janitor>>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache with the backend named in `config`.
    ///
    /// # Errors
    /// [`CacheError::RuntimeUnavailable`](crate::error::CacheError::RuntimeUnavailable)
    /// if a sweep interval is set and no tokio runtime is running.
    pub fn new(config: TtlCacheConfig) -> Result<Self> {
        config.validate()?;
        Self::with_backend(
            config.backend.build(),
            config.effective_default_expiration(),
            config.effective_sweep_interval(),
        )
    }
}

impl<V, B> TtlCache<V, B>
where
    V: Clone + Send + Sync + 'static,
    B: StorageBackend<V> + 'static,
{
    /// Creates a cache over an explicit backend.
    ///
    /// Zero durations are treated like `None`: a zero default expiration means
    /// "never", a zero sweep interval means no janitor.
    pub fn with_backend(
        backend: B,
        default_expiration: Option<Duration>,
        sweep_interval: Option<Duration>,
    ) -> Result<Self> {
        let core = Arc::new(TtlCore {
            backend,
            default_expiration: default_expiration.filter(|ttl| !ttl.is_zero()),
            stats: StatsRecorder::new(),
            _value: PhantomData,
        });

        let janitor = match sweep_interval.filter(|interval| !interval.is_zero()) {
            Some(interval) => {
                let weak = Arc::downgrade(&core);
                Some(Janitor::spawn("ttl janitor", interval, move || {
                    weak.upgrade().map(|core| core.sweep())
                })?)
            }
            None => None,
        };

        Ok(Self {
            core,
            janitor: Mutex::new(janitor),
        })
    }

    // == Get ==
    /// Returns the value for `key` if present and not expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let value = self
            .core
            .backend
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value);
        self.core.stats.record_lookup(value.is_some());
        value
    }

    /// Like [`TtlCache::get`], also returning the absolute expiration instant
    /// (`None` when the entry never expires).
    pub fn get_with_expiration(&self, key: &str) -> Option<(V, Option<DateTime<Utc>>)> {
        let found = self
            .core
            .backend
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| {
                let expires = entry.expiration();
                (entry.value, expires)
            });
        self.core.stats.record_lookup(found.is_some());
        found
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any existing entry.
    pub fn set(&self, key: impl Into<String>, value: V, expiration: Expiration) {
        let ttl = expiration.resolve(self.core.default_expiration);
        self.core.backend.set(key.into(), Entry::new(value, ttl));
    }

    /// Stores `value` under `key` with the cache's default expiration.
    pub fn set_default(&self, key: impl Into<String>, value: V) {
        self.set(key, value, Expiration::Default);
    }

    // == Delete ==
    /// Removes `key`. Does nothing if it is absent.
    pub fn delete(&self, key: &str) {
        self.core.backend.delete(key);
    }

    // == Sweep ==
    /// Deletes every expired entry and returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.core.sweep()
    }

    // == Items ==
    /// Copies all unexpired entries into a new map.
    pub fn items(&self) -> HashMap<String, Entry<V>> {
        let now = current_timestamp_nanos();
        let mut items = HashMap::with_capacity(self.core.backend.count());
        self.core.backend.for_each(&mut |key, entry| {
            if !entry.is_expired_at(now) {
                items.insert(key.to_string(), entry.clone());
            }
        });
        items
    }

    /// Number of stored entries, including expired ones not yet swept.
    /// Approximate under the atomic backend, see [`AtomicMap`](crate::cache::AtomicMap).
    pub fn item_count(&self) -> usize {
        self.core.backend.count()
    }

    // == Flush ==
    /// Removes all entries regardless of expiration.
    pub fn flush(&self) {
        self.core.backend.flush();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.core.stats.snapshot(self.item_count())
    }

    /// Cache-wide default expiration, `None` meaning "never".
    pub fn default_expiration(&self) -> Option<Duration> {
        self.core.default_expiration
    }

    /// Storage strategy in use.
    pub fn backend_kind(&self) -> BackendKind {
        self.core.backend.kind()
    }

    /// Returns true while a janitor is attached.
    pub fn has_janitor(&self) -> bool {
        self.janitor.lock().is_some()
    }

    // == Close ==
    /// Stops the janitor, if any. Safe to call more than once; dropping the
    /// cache does the same.
    pub fn close(&self) {
        if let Some(mut janitor) = self.janitor.lock().take() {
            janitor.stop();
        }
    }
}
