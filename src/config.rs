//! Configuration Module
//!
//! Construction-time parameters for both cache engines. The host process owns
//! where these come from; both structs deserialize with serde.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::BackendKind;
use crate::error::{CacheError, Result};

/// TTL cache configuration parameters.
///
/// A missing or zero `default_expiration` means entries set with
/// [`Expiration::Default`](crate::cache::Expiration::Default) never expire.
/// A missing or zero `sweep_interval` means no janitor is started; expired
/// entries then stay until deleted or until `sweep()` is called manually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlCacheConfig {
    /// Lifetime applied to entries set with the default expiration
    pub default_expiration: Option<Duration>,
    /// Interval between background sweeps
    pub sweep_interval: Option<Duration>,
    /// Storage strategy
    pub backend: BackendKind,
}

impl TtlCacheConfig {
    /// Config with no default expiration, no janitor and the locked backend.
    pub fn unbounded() -> Self {
        Self {
            default_expiration: None,
            sweep_interval: None,
            backend: BackendKind::default(),
        }
    }

    /// Sets the default expiration.
    pub fn with_default_expiration(mut self, ttl: Duration) -> Self {
        self.default_expiration = Some(ttl);
        self
    }

    /// Sets the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// Sets the storage strategy.
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Default expiration with zero normalized to "never".
    pub fn effective_default_expiration(&self) -> Option<Duration> {
        self.default_expiration.filter(|ttl| !ttl.is_zero())
    }

    /// Sweep interval with zero normalized to "no janitor".
    pub fn effective_sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval.filter(|interval| !interval.is_zero())
    }

    /// Every TTL configuration is valid; non-positive durations are normalized.
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Default for TtlCacheConfig {
    fn default() -> Self {
        Self {
            default_expiration: Some(Duration::from_secs(300)),
            sweep_interval: Some(Duration::from_secs(600)),
            backend: BackendKind::default(),
        }
    }
}

/// LRU cache configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LruCacheConfig {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Lifetime of every entry, refreshed on each `set`
    pub ttl: Duration,
    /// Interval between background GC passes, zero for none
    pub gc_interval: Duration,
}

impl LruCacheConfig {
    /// Creates a config from its three parameters.
    pub fn new(capacity: usize, ttl: Duration, gc_interval: Duration) -> Self {
        Self {
            capacity,
            ttl,
            gc_interval,
        }
    }

    /// Rejects parameters the LRU engine cannot run with.
    ///
    /// A zero `gc_interval` is accepted and means no GC task.
    ///
    /// # Errors
    /// [`CacheError::InvalidConfig`] if capacity or ttl is zero.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "ttl must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LruCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            ttl: Duration::from_secs(300),
            gc_interval: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_config_default() {
        let config = TtlCacheConfig::default();
        assert_eq!(config.default_expiration, Some(Duration::from_secs(300)));
        assert_eq!(config.sweep_interval, Some(Duration::from_secs(600)));
        assert_eq!(config.backend, BackendKind::Locked);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ttl_config_normalizes_zero_durations() {
        let config = TtlCacheConfig::unbounded()
            .with_default_expiration(Duration::ZERO)
            .with_sweep_interval(Duration::ZERO);

        assert_eq!(config.effective_default_expiration(), None);
        assert_eq!(config.effective_sweep_interval(), None);
    }

    #[test]
    fn test_ttl_config_builders() {
        let config = TtlCacheConfig::unbounded()
            .with_default_expiration(Duration::from_millis(50))
            .with_sweep_interval(Duration::from_millis(1))
            .with_backend(BackendKind::Striped);

        assert_eq!(
            config.effective_default_expiration(),
            Some(Duration::from_millis(50))
        );
        assert_eq!(config.effective_sweep_interval(), Some(Duration::from_millis(1)));
        assert_eq!(config.backend, BackendKind::Striped);
    }

    #[test]
    fn test_ttl_config_deserialize_with_defaults() {
        let config: TtlCacheConfig = serde_json::from_str(r#"{"backend":"atomic"}"#).unwrap();

        assert_eq!(config.backend, BackendKind::Atomic);
        assert_eq!(config.default_expiration, Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_lru_config_default() {
        let config = LruCacheConfig::default();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert_eq!(config.gc_interval, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lru_config_rejects_zero_values() {
        let base = LruCacheConfig::default();

        let zero_capacity = LruCacheConfig {
            capacity: 0,
            ..base.clone()
        };
        assert!(matches!(
            zero_capacity.validate(),
            Err(CacheError::InvalidConfig(_))
        ));

        let zero_ttl = LruCacheConfig {
            ttl: Duration::ZERO,
            ..base.clone()
        };
        assert!(matches!(zero_ttl.validate(), Err(CacheError::InvalidConfig(_))));

        // No GC task is a valid setup
        let zero_gc = LruCacheConfig {
            gc_interval: Duration::ZERO,
            ..base
        };
        assert!(zero_gc.validate().is_ok());
    }

    #[test]
    fn test_lru_config_roundtrip_json() {
        let config = LruCacheConfig::new(10, Duration::from_secs(1), Duration::from_secs(2));
        let json = serde_json::to_string(&config).unwrap();
        let parsed: LruCacheConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
    }
}
