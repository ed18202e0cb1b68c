//! Single-lock backend: one `RwLock` guards the whole map.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{BackendKind, StorageBackend};
use crate::cache::Entry;

// == Locked Map ==
/// `HashMap` behind a single reader/writer lock.
///
/// Reads share the lock; every write takes it exclusively. `count` is exact.
#[derive(Debug)]
pub struct LockedMap<V> {
    items: RwLock<HashMap<String, Entry<V>>>,
}

impl<V> LockedMap<V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> Default for LockedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> StorageBackend<V> for LockedMap<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<Entry<V>> {
        self.items.read().get(key).cloned()
    }

    fn set(&self, key: String, entry: Entry<V>) {
        self.items.write().insert(key, entry);
    }

    fn delete(&self, key: &str) {
        self.items.write().remove(key);
    }

    fn remove_if(&self, key: &str, predicate: &dyn Fn(&Entry<V>) -> bool) -> bool {
        let mut items = self.items.write();
        match items.get(key) {
            Some(entry) if predicate(entry) => {
                items.remove(key);
                true
            }
            _ => false,
        }
    }

    fn for_each(&self, visit: &mut dyn FnMut(&str, &Entry<V>)) {
        let items = self.items.read();
        for (key, entry) in items.iter() {
            visit(key, entry);
        }
    }

    fn count(&self) -> usize {
        self.items.read().len()
    }

    fn flush(&self) {
        self.items.write().clear();
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Locked
    }
}
