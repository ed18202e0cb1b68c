//! Cache Module
//!
//! Provides the two cache engines and their building blocks:
//! - [`TtlCache`]: expiring cache over a swappable [`StorageBackend`]
//! - [`LruCache`]: capacity-bounded least-recently-used cache with per-entry TTL

pub mod backend;
mod entry;
mod lru;
mod recency;
mod stats;
mod ttl;


// Re-export public types
pub use backend::{AtomicMap, BackendKind, LockedMap, StorageBackend, StripedMap};
pub use entry::{current_timestamp_nanos, Entry, Expiration};
pub use lru::LruCache;
pub use recency::RecencyList;
pub use stats::{CacheStats, StatsRecorder};
pub use ttl::TtlCache;
