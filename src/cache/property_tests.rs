//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache engine against a simple model.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use crate::cache::{Cache, CacheMetrics};
use crate::clock::{Clock, ManualClock};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;

fn new_store(capacity: usize) -> (Arc<ManualClock>, Cache<String, String>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let store = Cache::new(
        "proptest",
        capacity,
        clock.clone(),
        CacheMetrics::unregistered().unwrap(),
    );
    (clock, store)
}

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-f]{1,2}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}"
}

/// TTLs in seconds
fn ttl_strategy() -> impl Strategy<Value = i64> {
    1i64..120
}

/// A single operation against the cache
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String, ttl: i64 },
    Get { key: String },
    Delete { key: String },
    Advance { seconds: i64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy(), ttl_strategy())
            .prop_map(|(key, value, ttl)| CacheOp::Set { key, value, ttl }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
        (0i64..30).prop_map(|seconds| CacheOp::Advance { seconds }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Statistics: hits and misses reflect exactly what `get` returned.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let (clock, store) = new_store(TEST_MAX_ENTRIES);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value, ttl } => store.set(key, value, Duration::seconds(ttl)),
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => store.delete(&key),
                CacheOp::Advance { seconds } => clock.advance(Duration::seconds(seconds)),
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");
    }

    // Without capacity pressure the cache agrees with a map of
    // (value, expires_at) on every read.
    #[test]
    fn prop_matches_model_without_pressure(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let (clock, store) = new_store(TEST_MAX_ENTRIES);
        let mut model: HashMap<String, (String, chrono::DateTime<Utc>)> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value, ttl } => {
                    let expires_at = clock.now() + Duration::seconds(ttl);
                    model.insert(key.clone(), (value.clone(), expires_at));
                    store.set(key, value, Duration::seconds(ttl));
                }
                CacheOp::Get { key } => {
                    let now = clock.now();
                    let expected = model
                        .get(&key)
                        .filter(|(_, expires_at)| now < *expires_at)
                        .map(|(value, _)| value.clone());
                    prop_assert_eq!(store.get(&key), expected);
                }
                CacheOp::Delete { key } => {
                    model.remove(&key);
                    store.delete(&key);
                }
                CacheOp::Advance { seconds } => clock.advance(Duration::seconds(seconds)),
            }
        }
    }

    // Delete removes the entry.
    #[test]
    fn prop_delete_removes_entry(key in key_strategy(), value in value_strategy()) {
        let (_clock, store) = new_store(TEST_MAX_ENTRIES);

        store.set(key.clone(), value, Duration::hours(1));
        prop_assert!(store.get(&key).is_some(), "Key should exist before delete");

        store.delete(&key);
        prop_assert!(store.get(&key).is_none(), "Key should not exist after delete");
    }

    // Overwrite: the second value wins until the second expiry, never the first.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy(),
        ttl1 in ttl_strategy(),
        ttl2 in ttl_strategy(),
        gap in 0i64..60,
    ) {
        let (clock, store) = new_store(TEST_MAX_ENTRIES);

        store.set(key.clone(), value1, Duration::seconds(ttl1));
        clock.advance(Duration::seconds(gap));
        store.set(key.clone(), value2.clone(), Duration::seconds(ttl2));

        clock.advance(Duration::seconds(ttl2 - 1));
        prop_assert_eq!(store.get(&key), Some(value2));
        prop_assert_eq!(store.len(), 1);

        clock.advance(Duration::seconds(1));
        prop_assert_eq!(store.get(&key), None);
    }

    // Capacity: the number of entries never exceeds the bound.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..200),
        capacity in 1usize..20,
    ) {
        let (_clock, store) = new_store(capacity);

        for (key, value) in entries {
            store.set(key, value, Duration::hours(1));
            prop_assert!(
                store.len() <= capacity,
                "Cache size {} exceeds max {}",
                store.len(),
                capacity
            );
        }
    }

    // Expiration: visible strictly before `set_at + ttl`, gone from then on.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in key_strategy(),
        value in value_strategy(),
        ttl in ttl_strategy(),
        elapsed_ms in 0i64..240_000,
    ) {
        let (clock, store) = new_store(TEST_MAX_ENTRIES);

        store.set(key.clone(), value.clone(), Duration::seconds(ttl));
        clock.advance(Duration::milliseconds(elapsed_ms));

        let result = store.get(&key);
        if elapsed_ms < ttl * 1000 {
            prop_assert_eq!(result, Some(value));
        } else {
            prop_assert_eq!(result, None);
        }
    }

    // The most recently inserted key always survives its own insertion.
    #[test]
    fn prop_new_key_survives_insertion(
        keys in prop::collection::vec(key_strategy(), 1..60),
        capacity in 1usize..8,
    ) {
        let (_clock, store) = new_store(capacity);

        for key in keys {
            store.set(key.clone(), "v".to_string(), Duration::hours(1));
            prop_assert!(store.get(&key).is_some());
        }
    }
}
