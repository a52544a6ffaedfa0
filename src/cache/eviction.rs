//! Eviction Tracker Module
//!
//! Ranks keys by access frequency and recency to pick eviction victims.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Saturation point of the per-key frequency counter.
pub const MAX_FREQUENCY: u8 = 15;

/// Accesses per tracked slot between two frequency decays.
const DECAY_FACTOR: usize = 10;

// == Rank ==
/// Eviction rank of a key. Lower ranks are evicted first.
///
/// Ordered by frequency, then by the tick of the last access. Ticks are
/// unique, so no two keys ever share a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Rank {
    frequency: u8,
    last_access: u64,
}

// == Eviction Tracker ==
/// Approximate LFU tracker with LRU tie-breaking.
///
/// Each access bumps a small saturating counter. Every `capacity * 10`
/// accesses all counters are halved so that keys which were popular a long
/// time ago eventually become evictable again.
#[derive(Debug)]
pub struct EvictionTracker<K> {
    /// Current rank of every tracked key
    ranks: HashMap<K, Rank>,
    /// Keys ordered from first to last eviction candidate
    order: BTreeMap<Rank, K>,
    /// Logical access clock
    tick: u64,
    /// Accesses recorded since the last decay
    accesses_since_decay: usize,
    /// Accesses between two decays
    decay_window: usize,
}

impl<K> EvictionTracker<K>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an empty tracker sized for a cache of `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            ranks: HashMap::new(),
            order: BTreeMap::new(),
            tick: 0,
            accesses_since_decay: 0,
            decay_window: capacity.saturating_mul(DECAY_FACTOR).max(16),
        }
    }

    // == Insert ==
    /// Starts tracking `key`, or counts an access if it is already tracked.
    pub fn insert(&mut self, key: K) {
        if self.ranks.contains_key(&key) {
            self.touch(&key);
            return;
        }

        let rank = Rank {
            frequency: 1,
            last_access: self.next_tick(),
        };
        self.ranks.insert(key.clone(), rank);
        self.order.insert(rank, key);
        self.record_access();
    }

    // == Touch ==
    /// Records an access to a tracked key. Unknown keys are ignored.
    pub fn touch<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let tick = self.tick + 1;
        let Some(rank) = self.ranks.get_mut(key) else {
            return;
        };
        self.tick = tick;

        let Some(owned) = self.order.remove(&*rank) else {
            return;
        };
        *rank = Rank {
            frequency: rank.frequency.saturating_add(1).min(MAX_FREQUENCY),
            last_access: tick,
        };
        self.order.insert(*rank, owned);
        self.record_access();
    }

    // == Remove ==
    /// Stops tracking `key`.
    pub fn remove<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(rank) = self.ranks.remove(key) {
            self.order.remove(&rank);
        }
    }

    // == Victim ==
    /// Returns the key that would be evicted next, without removing it.
    pub fn victim(&self) -> Option<&K> {
        self.order.values().next()
    }

    // == Frequency ==
    /// Returns the current frequency counter of `key`.
    #[cfg(test)]
    pub fn frequency<Q>(&self, key: &Q) -> Option<u8>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ranks.get(key).map(|rank| rank.frequency)
    }

    // == Length ==
    /// Returns the number of tracked keys.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    // == Is Empty ==
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn record_access(&mut self) {
        self.accesses_since_decay += 1;
        if self.accesses_since_decay >= self.decay_window {
            self.decay();
        }
    }

    /// Halves every frequency counter, keeping the recency order intact.
    fn decay(&mut self) {
        self.accesses_since_decay = 0;
        self.order.clear();
        for (key, rank) in self.ranks.iter_mut() {
            rank.frequency /= 2;
            self.order.insert(*rank, key.clone());
        }
    }
}
