//! Mini Cache - in-process key-value caching
//!
//! Two engines with lazy expiration and background cleanup:
//! - [`TtlCache`]: per-entry expiration over a pluggable concurrent backend
//! - [`LruCache`]: bounded least-recently-used cache with a fixed TTL
//!
//! Background sweep tasks run on the ambient tokio runtime and stop when the
//! cache is closed or dropped.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{BackendKind, CacheStats, Entry, Expiration, LruCache, StorageBackend, TtlCache};
pub use config::{LruCacheConfig, TtlCacheConfig};
pub use error::{CacheError, Result};
