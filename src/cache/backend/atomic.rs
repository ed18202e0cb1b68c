//! Atomic sharded backend built on `DashMap`.

use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;

use super::{BackendKind, StorageBackend};
use crate::cache::Entry;

// == Atomic Map ==
/// `DashMap` with a separately maintained atomic entry counter.
///
/// Per-key operations never block the whole map. The counter is bumped on
/// every `set`, including overwrites of an existing key, so [`count`] can
/// overshoot the true number of entries until those keys are deleted or the
/// map is flushed. Deletes only decrement when an entry was actually removed.
///
/// [`count`]: StorageBackend::count
#[derive(Debug)]
pub struct AtomicMap<V> {
    items: DashMap<String, Entry<V>>,
    count: AtomicI64,
}

impl<V> AtomicMap<V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
            count: AtomicI64::new(0),
        }
    }

    /// Exact number of stored entries, walking every shard.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<V> Default for AtomicMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> StorageBackend<V> for AtomicMap<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<Entry<V>> {
        self.items.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: String, entry: Entry<V>) {
        self.items.insert(key, entry);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    fn delete(&self, key: &str) {
        if self.items.remove(key).is_some() {
            self.count.fetch_sub(1, Ordering::Relaxed);
        }
    }

    fn remove_if(&self, key: &str, predicate: &dyn Fn(&Entry<V>) -> bool) -> bool {
        let removed = self
            .items
            .remove_if(key, |_, entry| predicate(entry))
            .is_some();
        if removed {
            self.count.fetch_sub(1, Ordering::Relaxed);
        }
        removed
    }

    fn for_each(&self, visit: &mut dyn FnMut(&str, &Entry<V>)) {
        for item in self.items.iter() {
            visit(item.key(), item.value());
        }
    }

    fn count(&self) -> usize {
        usize::try_from(self.count.load(Ordering::Relaxed)).unwrap_or(0)
    }

    fn flush(&self) {
        self.items.clear();
        self.count.store(0, Ordering::Relaxed);
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Atomic
    }
}
