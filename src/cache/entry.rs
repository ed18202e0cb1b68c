//! Cache Entry Module
//!
//! Defines the record stored for each key, the expiration sentinels callers
//! pass to `set`, and the wall-clock helper both engines share.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, TimeZone, Utc};

// == Expiration ==
/// Lifetime requested for an entry at `set` time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiration {
    /// Use the cache-wide default expiration.
    #[default]
    Default,
    /// The entry never expires.
    Never,
    /// The entry expires this long after it is written.
    /// A zero duration behaves like [`Expiration::Default`].
    After(Duration),
}

impl Expiration {
    // == Resolve ==
    /// Resolves the sentinel against the cache-wide default.
    ///
    /// Returns the relative lifetime of the entry, or `None` when it never expires.
    /// A zero default means "never".
    pub fn resolve(self, default: Option<Duration>) -> Option<Duration> {
        match self {
            Expiration::Never => None,
            Expiration::After(ttl) if !ttl.is_zero() => Some(ttl),
            Expiration::Default | Expiration::After(_) => default.filter(|ttl| !ttl.is_zero()),
        }
    }
}

impl From<Duration> for Expiration {
    fn from(ttl: Duration) -> Self {
        Expiration::After(ttl)
    }
}

// == Cache Entry ==
/// A value together with its absolute expiration instant.
///
/// Entries are replaced wholesale on update; the cache never mutates one in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<V> {
    /// The stored value
    pub value: V,
    /// Expiration timestamp (Unix nanoseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` from now, or never when `ttl` is `None`.
    pub fn new(value: V, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|ttl| deadline_after(current_timestamp_nanos(), ttl));
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is strictly past its
    /// expiration timestamp. Entries without a timestamp never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_nanos())
    }

    /// Same as [`Entry::is_expired`] against a caller-supplied clock reading,
    /// so a sweep can judge every entry against one instant.
    pub fn is_expired_at(&self, now: u64) -> bool {
        matches!(self.expires_at, Some(expires) if now > expires)
    }

    // == Expiration Instant ==
    /// Returns the absolute expiration instant, or None if the entry never expires.
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .map(|nanos| Utc.timestamp_nanos(i64::try_from(nanos).unwrap_or(i64::MAX)))
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has a TTL that hasn't elapsed
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at.map(|expires| {
            Duration::from_nanos(expires.saturating_sub(current_timestamp_nanos()))
        })
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in nanoseconds.
pub fn current_timestamp_nanos() -> u64 {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    u64::try_from(since_epoch.as_nanos()).unwrap_or(u64::MAX)
}

/// Adds `ttl` to a nanosecond timestamp, saturating instead of wrapping.
pub(crate) fn deadline_after(now: u64, ttl: Duration) -> u64 {
    now.saturating_add(u64::try_from(ttl.as_nanos()).unwrap_or(u64::MAX))
}
