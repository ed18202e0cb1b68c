//! Error types for the cache engines
//!
//! Provides unified error handling using thiserror. Only construction can fail:
//! lookups report absence through `Option`, never through an error.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Configuration rejected by `validate()`
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A background task was requested outside of a tokio runtime
    #[error("No tokio runtime available to run the background sweep task")]
    RuntimeUnavailable,
}

// == Result Type Alias ==
/// Convenience Result type for the cache engines.
pub type Result<T> = std::result::Result<T, CacheError>;
