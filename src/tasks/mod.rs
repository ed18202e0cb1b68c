//! Background Tasks Module
//!
//! Contains the periodic task that keeps a cache free of expired entries.
//!
//! # Tasks
//! - Janitor: calls its owner's sweep routine on a fixed interval. The TTL
//!   cache runs one as its janitor, the LRU cache as its GC task.

mod janitor;

pub use janitor::Janitor;
