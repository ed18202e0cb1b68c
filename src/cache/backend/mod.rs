//! Storage Backends
//!
//! Interchangeable concurrent key -> entry maps underneath [`TtlCache`](crate::cache::TtlCache).
//! The variants differ only in how they synchronize, never in what they store:
//!
//! - [`LockedMap`]: one reader/writer lock around a single `HashMap`
//! - [`AtomicMap`]: a `DashMap` with a separately maintained atomic entry counter
//! - [`StripedMap`]: a fixed set of independently locked `HashMap` shards
//!
//! Every variant replaces an entry as a whole, so a `get` never observes a
//! partially written value.

mod atomic;
mod locked;
mod striped;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cache::Entry;

pub use atomic::AtomicMap;
pub use locked::LockedMap;
pub use striped::{StripedMap, SHARD_COUNT};

// == Storage Backend ==
/// Contract shared by all storage strategies.
///
/// Visitors passed to [`StorageBackend::for_each`] run while the backend holds
/// internal read locks and must not call back into the same backend.
pub trait StorageBackend<V>: Send + Sync {
    /// Looks up a key without mutating anything.
    fn get(&self, key: &str) -> Option<Entry<V>>;

    /// Inserts or replaces the entry for a key.
    fn set(&self, key: String, entry: Entry<V>);

    /// Removes a key if present.
    fn delete(&self, key: &str);

    /// Removes a key only if its current entry satisfies `predicate`, checked
    /// and removed atomically. Returns whether an entry was removed.
    fn remove_if(&self, key: &str, predicate: &dyn Fn(&Entry<V>) -> bool) -> bool;

    /// Visits every entry. Order is unspecified and concurrent writers may
    /// or may not be observed.
    fn for_each(&self, visit: &mut dyn FnMut(&str, &Entry<V>));

    /// Number of stored entries. May be approximate under concurrent mutation.
    fn count(&self) -> usize;

    /// Removes all entries.
    fn flush(&self);

    /// Which strategy this backend implements.
    fn kind(&self) -> BackendKind;
}

impl<V, B> StorageBackend<V> for Box<B>
where
    B: StorageBackend<V> + ?Sized,
{
    fn get(&self, key: &str) -> Option<Entry<V>> {
        (**self).get(key)
    }

    fn set(&self, key: String, entry: Entry<V>) {
        (**self).set(key, entry)
    }

    fn delete(&self, key: &str) {
        (**self).delete(key)
    }

    fn remove_if(&self, key: &str, predicate: &dyn Fn(&Entry<V>) -> bool) -> bool {
        (**self).remove_if(key, predicate)
    }

    fn for_each(&self, visit: &mut dyn FnMut(&str, &Entry<V>)) {
        (**self).for_each(visit)
    }

    fn count(&self) -> usize {
        (**self).count()
    }

    fn flush(&self) {
        (**self).flush()
    }

    fn kind(&self) -> BackendKind {
        (**self).kind()
    }
}

// == Backend Kind ==
/// Selects a storage strategy at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Single reader/writer lock
    #[default]
    Locked,
    /// DashMap with an atomic counter
    Atomic,
    /// Independently locked shards
    Striped,
}

impl BackendKind {
    /// All strategies, in declaration order.
    pub const ALL: [BackendKind; 3] = [
        BackendKind::Locked,
        BackendKind::Atomic,
        BackendKind::Striped,
    ];

    /// Constructs an empty backend of this kind.
    pub fn build<V>(self) -> Box<dyn StorageBackend<V>>
    where
        V: Clone + Send + Sync + 'static,
    {
        match self {
            BackendKind::Locked => Box::new(LockedMap::new()),
            BackendKind::Atomic => Box::new(AtomicMap::new()),
            BackendKind::Striped => Box::new(StripedMap::new()),
        }
    }

    /// Short lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Locked => "locked",
            BackendKind::Atomic => "atomic",
            BackendKind::Striped => "striped",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
