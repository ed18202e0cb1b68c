//! Striped backend: the key space is split across independently locked shards.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use parking_lot::RwLock;

use super::{BackendKind, StorageBackend};
use crate::cache::Entry;

/// Number of shards in a [`StripedMap`].
pub const SHARD_COUNT: usize = 32;

type Shard<V> = RwLock<HashMap<String, Entry<V>>>;

// == Striped Map ==
/// Fixed array of `RwLock<HashMap>` shards selected by key hash.
///
/// Writers to different shards never contend. `count` and `for_each` walk the
/// shards one at a time, so neither sees a single global snapshot.
#[derive(Debug)]
pub struct StripedMap<V> {
    shards: Box<[Shard<V>]>,
}

impl<V> StripedMap<V> {
    /// Creates an empty map with [`SHARD_COUNT`] shards.
    pub fn new() -> Self {
        let shards = (0..SHARD_COUNT)
            .map(|_| RwLock::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { shards }
    }

    /// Get shard index for key
    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    /// Get shard for key
    fn shard(&self, key: &str) -> &Shard<V> {
        &self.shards[self.shard_index(key)]
    }
}

impl<V> Default for StripedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> StorageBackend<V> for StripedMap<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<Entry<V>> {
        self.shard(key).read().get(key).cloned()
    }

    fn set(&self, key: String, entry: Entry<V>) {
        self.shard(&key).write().insert(key, entry);
    }

    fn delete(&self, key: &str) {
        self.shard(key).write().remove(key);
    }

    fn remove_if(&self, key: &str, predicate: &dyn Fn(&Entry<V>) -> bool) -> bool {
        let mut shard = self.shard(key).write();
        match shard.get(key) {
            Some(entry) if predicate(entry) => {
                shard.remove(key);
                true
            }
            _ => false,
        }
    }

    fn for_each(&self, visit: &mut dyn FnMut(&str, &Entry<V>)) {
        for shard in self.shards.iter() {
            let shard = shard.read();
            for (key, entry) in shard.iter() {
                visit(key, entry);
            }
        }
    }

    fn count(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    fn flush(&self) {
        for shard in self.shards.iter() {
            shard.write().clear();
        }
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Striped
    }
}
