//! Cache Store Module
//!
//! Bounded, thread-safe cache engine with per-entry TTL and
//! frequency/recency-aware eviction.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::metrics::{CacheMetrics, LookupOutcome};
use crate::cache::stats::StatCounters;
use crate::cache::{CacheEntry, CacheStats, EvictionTracker, DEFAULT_CAPACITY};
use crate::clock::SharedClock;

// == Slot ==
/// Stored entry plus the sequence number indexing it by expiry.
#[derive(Debug)]
struct Slot<K, V> {
    entry: CacheEntry<K, V>,
    seq: u64,
}

// == Inner ==
/// State guarded by the cache lock.
#[derive(Debug)]
struct Inner<K, V> {
    /// Key-value storage
    entries: HashMap<K, Slot<K, V>>,
    /// Entries ordered by expiry instant
    expirations: BTreeMap<(DateTime<Utc>, u64), K>,
    /// Eviction ranking
    tracker: EvictionTracker<K>,
    next_seq: u64,
}

impl<K, V> Inner<K, V>
where
    K: Hash + Eq + Clone,
{
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            expirations: BTreeMap::new(),
            tracker: EvictionTracker::new(capacity),
            next_seq: 0,
        }
    }

    fn remove<Q>(&mut self, key: &Q) -> Option<CacheEntry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.entries.remove(key)?;
        self.expirations.remove(&(slot.entry.expires_at, slot.seq));
        self.tracker.remove(key);
        Some(slot.entry)
    }

    /// Removes every entry expired at `now`. Returns how many were removed.
    fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        while let Some((&(expires_at, _), _)) = self.expirations.first_key_value() {
            if now < expires_at {
                break;
            }
            let Some((_, key)) = self.expirations.pop_first() else {
                break;
            };
            if let Some(slot) = self.entries.remove(&key) {
                debug_assert!(slot.entry.is_expired_at(now));
                self.tracker.remove(&key);
                removed += 1;
            }
        }
        removed
    }

    fn insert(&mut self, entry: CacheEntry<K, V>) {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.expirations
            .insert((entry.expires_at, seq), entry.key.clone());
        self.tracker.insert(entry.key.clone());
        if let Some(previous) = self.entries.insert(entry.key.clone(), Slot { entry, seq }) {
            self.expirations
                .remove(&(previous.entry.expires_at, previous.seq));
        }
    }
}

// == Cache ==
/// Named, bounded cache mapping keys to values with an absolute expiry.
///
/// All methods take `&self`; the entry map, expiry index and eviction
/// tracker sit behind a single mutex, and the counters are atomics. Share an
/// instance between tasks with `Arc<Cache<K, V>>`.
#[derive(Debug)]
pub struct Cache<K, V> {
    name: String,
    capacity: usize,
    clock: SharedClock,
    metrics: CacheMetrics,
    counters: StatCounters,
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// A `capacity` of zero falls back to [`DEFAULT_CAPACITY`].
    pub fn new(
        name: impl Into<String>,
        capacity: usize,
        clock: SharedClock,
        metrics: CacheMetrics,
    ) -> Self {
        let name = name.into();
        let capacity = if capacity == 0 {
            warn!(
                cache = %name,
                "Cache capacity must be at least 1, falling back to {}", DEFAULT_CAPACITY
            );
            DEFAULT_CAPACITY
        } else {
            capacity
        };

        Self {
            name,
            capacity,
            clock,
            metrics,
            counters: StatCounters::default(),
            inner: Mutex::new(Inner::new(capacity)),
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` if the key is absent or its entry has expired. An
    /// expired entry is removed on the spot and counted as a miss.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let value = {
            let mut inner = self.inner.lock();
            match inner.entries.get(key).map(|slot| slot.entry.is_expired_at(now)) {
                Some(true) => {
                    inner.remove(key);
                    self.counters.record_expirations(1);
                    None
                }
                Some(false) => {
                    inner.tracker.touch(key);
                    inner.entries.get(key).map(|slot| slot.entry.value.clone())
                }
                None => None,
            }
        };

        let outcome = if value.is_some() {
            self.counters.record_hit();
            LookupOutcome::Hit
        } else {
            self.counters.record_miss();
            LookupOutcome::Miss
        };
        self.metrics.record(&self.name, outcome);

        value
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`.
    ///
    /// Overwrites any existing entry and resets its expiry. A `ttl` of zero
    /// or less means the entry is already expired: any previous entry for the
    /// key is dropped and nothing is stored.
    ///
    /// Inserting a new key into a full cache first reclaims expired entries;
    /// if none are expired, the least frequently used entry is evicted, the
    /// least recently used one among equals.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        if ttl <= Duration::zero() {
            inner.remove(&key);
            return;
        }

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            let expired = inner.purge_expired(now);
            self.counters.record_expirations(expired);

            let mut evicted = 0;
            while inner.entries.len() >= self.capacity {
                let Some(victim) = inner.tracker.victim().cloned() else {
                    break;
                };
                inner.remove(&victim);
                evicted += 1;
            }
            if evicted > 0 {
                self.counters.record_evictions(evicted);
                debug!(cache = %self.name, evicted, "Evicted entries to make room");
            }
        }

        inner.insert(CacheEntry::new(key, value, now, ttl));
    }

    // == Delete ==
    /// Removes the entry for `key`. Absent keys are ignored.
    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().remove(key);
    }

    // == Cleanup Expired ==
    /// Removes all entries that `get` would report as expired.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = self.inner.lock().purge_expired(now);
        self.counters.record_expirations(removed);
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.counters
            .snapshot(&self.name, self.len(), self.capacity)
    }

    /// Returns the instance name used as the metrics label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet
    /// reclaimed.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
