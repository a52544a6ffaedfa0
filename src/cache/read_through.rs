//! Read-Through Cache Module
//!
//! Cache-aside policy layered over a [`Cache`]: serve hits from memory, load
//! misses from the source of truth and remember the result for a fixed TTL.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use crate::cache::Cache;

// == Read-Through Cache ==
/// A [`Cache`] instance paired with the refresh TTL used to populate it.
///
/// Writes to the underlying entity do not invalidate entries; a cached value
/// can be stale for at most `ttl`.
#[derive(Debug)]
pub struct ReadThroughCache<K, V> {
    cache: Arc<Cache<K, V>>,
    ttl: Duration,
}

impl<K, V> ReadThroughCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Wraps `cache`, populating it with entries that live for `ttl`.
    pub fn new(cache: Arc<Cache<K, V>>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Returns the cached value for `key`, or runs `load` and caches its
    /// result.
    ///
    /// A failed load is returned as-is and leaves the cache untouched, so the
    /// next call retries the source. Dropping the returned future before
    /// `load` finishes never populates the cache.
    pub async fn get_or_load<F, Fut, E>(&self, key: &K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.cache.get(key) {
            return Ok(value);
        }

        debug!(cache = %self.cache.name(), "Cache miss, loading from source");
        let value = load().await?;
        self.cache.set(key.clone(), value.clone(), self.ttl);

        Ok(value)
    }

    /// Returns the underlying cache.
    pub fn cache(&self) -> &Arc<Cache<K, V>> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheMetrics;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() -> (Arc<ManualClock>, ReadThroughCache<String, String>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let cache = Arc::new(Cache::new(
            "user-by-email",
            10,
            clock.clone(),
            CacheMetrics::unregistered().unwrap(),
        ));
        (clock, ReadThroughCache::new(cache, Duration::minutes(15)))
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_is_served_from_cache() {
        let (_clock, cache) = setup();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let key = "a@example.com".to_string();

        for _ in 0..2 {
            let value: Result<String, String> = cache
                .get_or_load(&key, move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok("alice".to_string())
                })
                .await;
            assert_eq!(value.unwrap(), "alice");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reload_after_ttl() {
        let (clock, cache) = setup();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let key = "a@example.com".to_string();

        let load = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>("alice".to_string())
        };

        cache.get_or_load(&key, load).await.unwrap();
        clock.advance(Duration::minutes(14));
        cache.get_or_load(&key, load).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::minutes(1));
        cache.get_or_load(&key, load).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let (_clock, cache) = setup();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let key = "missing@example.com".to_string();

        let first: Result<String, String> = cache
            .get_or_load(&key, move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("user not found".to_string())
            })
            .await;
        assert_eq!(first.unwrap_err(), "user not found");
        assert!(cache.cache().is_empty());

        let second: Result<String, String> = cache
            .get_or_load(&key, move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("bob".to_string())
            })
            .await;
        assert_eq!(second.unwrap(), "bob");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancelled_load_does_not_populate() {
        let (_clock, cache) = setup();
        let key = "slow@example.com".to_string();

        let pending = cache.get_or_load(&key, || async {
            std::future::pending::<()>().await;
            Ok::<_, String>("never".to_string())
        });
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(10), pending).await;

        assert!(timed_out.is_err());
        assert!(cache.cache().is_empty());
    }

    #[tokio::test]
    async fn test_writes_do_not_invalidate() {
        let (_clock, cache) = setup();
        let key = "a@example.com".to_string();

        cache
            .get_or_load(&key, || async { Ok::<_, String>("old".to_string()) })
            .await
            .unwrap();

        // The source changed, but the cached entry is still within its TTL
        let value = cache
            .get_or_load(&key, || async { Ok::<_, String>("new".to_string()) })
            .await
            .unwrap();
        assert_eq!(value, "old");
    }
}
