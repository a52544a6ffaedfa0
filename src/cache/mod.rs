//! Cache Module
//!
//! Bounded in-memory caching with per-entry TTL, frequency/recency-aware
//! eviction and a read-through wrapper.

mod entry;
mod eviction;
mod metrics;
mod read_through;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use eviction::{EvictionTracker, MAX_FREQUENCY};
pub use metrics::{CacheMetrics, LookupOutcome};
pub use read_through::ReadThroughCache;
pub use stats::CacheStats;
pub use store::Cache;

// == Public Constants ==
/// Capacity used when a cache is configured with zero capacity
pub const DEFAULT_CAPACITY: usize = 1000;

// == Expiry Sweep ==
/// Type-erased view of a cache for the background cleanup task and the
/// stats endpoint.
pub trait ExpirySweep: Send + Sync {
    /// Name of the swept cache.
    fn name(&self) -> &str;

    /// Removes expired entries, returning how many were removed.
    fn purge_expired(&self) -> usize;

    /// Snapshot of the cache's counters.
    fn stats(&self) -> CacheStats;
}

impl<K, V> ExpirySweep for Cache<K, V>
where
    K: std::hash::Hash + Eq + Clone + Send,
    V: Clone + Send,
{
    fn name(&self) -> &str {
        Cache::name(self)
    }

    fn purge_expired(&self) -> usize {
        Cache::purge_expired(self)
    }

    fn stats(&self) -> CacheStats {
        Cache::stats(self)
    }
}
