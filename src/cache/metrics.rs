//! Cache Metrics Module
//!
//! Prometheus counters for cache lookups, labelled by cache name and result.

use std::fmt;

use prometheus::{IntCounterVec, Opts, Registry};

// == Lookup Outcome ==
/// Result label of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Hit,
    Miss,
}

impl LookupOutcome {
    /// Returns the label value used in the `result` dimension.
    pub fn as_str(self) -> &'static str {
        match self {
            LookupOutcome::Hit => "hit",
            LookupOutcome::Miss => "miss",
        }
    }
}

// == Cache Metrics ==
/// Observability handle injected into every cache instance.
///
/// Cloning is cheap and every clone feeds the same counter family, so one
/// handle can be shared by all caches registered on a registry.
#[derive(Clone)]
pub struct CacheMetrics {
    lookups: IntCounterVec,
}

impl fmt::Debug for CacheMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheMetrics").finish_non_exhaustive()
    }
}

impl CacheMetrics {
    // == Constructor ==
    /// Creates the counter family and registers it on `registry`.
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let metrics = Self::unregistered()?;
        registry.register(Box::new(metrics.lookups.clone()))?;
        Ok(metrics)
    }

    /// Creates a counter family that is not exported anywhere.
    pub fn unregistered() -> prometheus::Result<Self> {
        let lookups = IntCounterVec::new(
            Opts::new("cache_lookups_total", "Cache lookups by cache name and result"),
            &["cache_name", "result"],
        )?;
        Ok(Self { lookups })
    }

    /// Counts one lookup against `cache_name`.
    pub fn record(&self, cache_name: &str, outcome: LookupOutcome) {
        self.lookups
            .with_label_values(&[cache_name, outcome.as_str()])
            .inc();
    }

    /// Returns the current count for `(cache_name, outcome)`.
    pub fn count(&self, cache_name: &str, outcome: LookupOutcome) -> u64 {
        self.lookups
            .with_label_values(&[cache_name, outcome.as_str()])
            .get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_keyed_by_name_and_result() {
        let metrics = CacheMetrics::unregistered().unwrap();

        metrics.record("user-by-email", LookupOutcome::Hit);
        metrics.record("user-by-email", LookupOutcome::Hit);
        metrics.record("user-by-email", LookupOutcome::Miss);
        metrics.record("article-by-slug", LookupOutcome::Miss);

        assert_eq!(metrics.count("user-by-email", LookupOutcome::Hit), 2);
        assert_eq!(metrics.count("user-by-email", LookupOutcome::Miss), 1);
        assert_eq!(metrics.count("article-by-slug", LookupOutcome::Hit), 0);
        assert_eq!(metrics.count("article-by-slug", LookupOutcome::Miss), 1);
    }

    #[test]
    fn test_registered_family_is_gathered() {
        let registry = Registry::new();
        let metrics = CacheMetrics::new(&registry).unwrap();
        metrics.record("jwt-blocklist", LookupOutcome::Miss);

        let families = registry.gather();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].get_name(), "cache_lookups_total");
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        CacheMetrics::new(&registry).unwrap();
        assert!(CacheMetrics::new(&registry).is_err());
    }
}
