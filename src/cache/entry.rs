//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with an absolute expiry.

use chrono::{DateTime, Duration, Utc};

// == Cache Entry ==
/// A single cached value together with its key and expiration instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<K, V> {
    /// The key the entry is stored under
    pub key: K,
    /// The stored value
    pub value: V,
    /// Instant at which the entry stops being visible
    pub expires_at: DateTime<Utc>,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates an entry expiring `ttl` after `now`.
    ///
    /// A TTL that would overflow the calendar saturates to the latest
    /// representable instant.
    pub fn new(key: K, value: V, now: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = now
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            key,
            value,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is expired at `now`.
    ///
    /// Boundary condition: the entry is expired once `now >= expires_at`, so
    /// it is already gone at the exact instant its TTL elapses. Reads, sweeps
    /// and eviction all use this one test.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
