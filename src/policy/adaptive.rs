//! Adaptive replacement cache orchestrator.
//!
//! Routes every `get`/`put` between a recency partition and a frequency
//! partition, and rebalances their capacities using the partitions' ghost
//! histories as feedback.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         AdaptiveCache<K, V>                             │
//! │                                                                         │
//! │    get/put ──► check_ghosts(key)                                        │
//! │                 │                                                       │
//! │                 ├─ hit in recency ghost ──► frequency.shrink ──┐        │
//! │                 │                           on success:        ▼        │
//! │                 │                           recency.grow  (one unit     │
//! │                 │                                          moves)       │
//! │                 └─ hit in frequency ghost ─► symmetric                  │
//! │                                                                         │
//! │   ┌────────────────────────────┐    ┌────────────────────────────────┐  │
//! │   │ RecencyPartition           │    │ FrequencyPartition             │  │
//! │   │  LRU main store + ghost    │    │  count-bucketed main store     │  │
//! │   │  access counts grow on get │    │  + ghost                       │  │
//! │   └────────────┬───────────────┘    └────────────▲───────────────────┘  │
//! │                │   access count ≥ threshold      │                      │
//! │                └──────── promotion (copy) ───────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Routing rules
//!
//! - `put`: after the ghost probe, a key found in neither ghost goes to the
//!   frequency partition iff it is already resident there, otherwise to the
//!   recency partition. A key found in a ghost re-enters through the
//!   recency partition unconditionally and earns promotion again through
//!   repeated access.
//! - `get`: the ghost probe runs for its rebalancing side effect only. The
//!   recency partition answers first; when it signals the promotion
//!   threshold, the key/value pair is additionally written into the
//!   frequency partition. The recency copy stays resident until ordinary
//!   capacity pressure evicts it, so a key can briefly live in both main
//!   stores.
//!
//! ## Concurrency
//!
//! Each partition serializes its own operations behind one mutex; the
//! orchestrator composes those calls without a lock of its own. The ghost
//! probe and the routed operation are therefore not atomic as a pair;
//! concurrent callers can interleave between them. That relaxed consistency
//! is accepted: each partition stays internally consistent, and a global
//! lock would serialize the two partitions against each other.
//!
//! ## Example
//!
//! ```
//! use arckit::policy::adaptive::AdaptiveCache;
//!
//! let cache = AdaptiveCache::new(8);
//! cache.put("page", "content");
//! assert_eq!(cache.get(&"page"), Some("content"));
//! assert_eq!(cache.get(&"missing"), None);
//! ```

use std::hash::Hash;

#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::{AdaptiveMetricsSnapshot, MetricsRecorder};
use crate::policy::frequency::FrequencyPartition;
use crate::policy::recency::RecencyPartition;

/// Access count at which a recency-resident key becomes eligible for
/// promotion into the frequency partition, unless overridden at
/// construction.
pub const DEFAULT_PROMOTION_THRESHOLD: usize = 3;

/// Self-tuning two-partition replacement cache.
///
/// Both partitions start with the same main-store capacity; ghost hits move
/// capacity between them one unit at a time. All methods take `&self` and
/// the cache is `Send + Sync` for `Send` key/value types, so it can be
/// shared across threads behind an `Arc` without external locking.
///
/// # Example
///
/// ```
/// use arckit::policy::adaptive::AdaptiveCache;
///
/// let cache = AdaptiveCache::with_threshold(4, 2);
/// cache.put(1, "one");
/// cache.get(&1); // access count 2 reaches the threshold: promoted
/// assert!(cache.frequency_contains(&1));
/// assert!(cache.recency_contains(&1)); // the recency copy remains
/// ```
#[derive(Debug)]
pub struct AdaptiveCache<K, V> {
    recency: RecencyPartition<K, V>,
    frequency: FrequencyPartition<K, V>,
    initial_capacity: usize,
    promotion_threshold: usize,
    #[cfg(feature = "metrics")]
    metrics: MetricsRecorder,
}

impl<K, V> AdaptiveCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache whose partitions each start with `capacity` entries
    /// of main store, using [`DEFAULT_PROMOTION_THRESHOLD`].
    pub fn new(capacity: usize) -> Self {
        Self::with_threshold(capacity, DEFAULT_PROMOTION_THRESHOLD)
    }

    /// Creates a cache with an explicit promotion threshold.
    ///
    /// Each partition's ghost history is fixed at `capacity` keys for the
    /// cache's lifetime, regardless of later capacity transfers.
    pub fn with_threshold(capacity: usize, promotion_threshold: usize) -> Self {
        Self {
            recency: RecencyPartition::new(capacity, promotion_threshold),
            frequency: FrequencyPartition::new(capacity),
            initial_capacity: capacity,
            promotion_threshold,
            #[cfg(feature = "metrics")]
            metrics: MetricsRecorder::new(),
        }
    }

    /// Inserts or overwrites `key`.
    ///
    /// The ghost probe runs first and may transfer capacity. A key found in
    /// a ghost history re-enters through the recency partition; otherwise
    /// the write goes to whichever partition already holds the key in its
    /// main store (the recency partition for new keys). With both
    /// partitions at capacity 0 this is a no-op.
    pub fn put(&self, key: K, value: V) {
        #[cfg(feature = "metrics")]
        self.metrics.record_put();

        let in_ghost = self.check_ghosts(&key);
        if in_ghost || !self.frequency.contains_in_main(&key) {
            self.recency.put(key, value);
        } else {
            self.frequency.put(key, value);
        }
    }

    /// Returns the value for `key` if it is resident in either partition.
    ///
    /// Side effects: the ghost probe may transfer capacity; a recency hit
    /// refreshes recency order and grows the access count; crossing the
    /// promotion threshold additionally copies the entry into the frequency
    /// partition; a frequency hit re-buckets the entry.
    pub fn get(&self, key: &K) -> Option<V> {
        self.check_ghosts(key);

        if let Some((value, promote)) = self.recency.get_with_promotion(key) {
            if promote {
                self.frequency.put(key.clone(), value.clone());
                #[cfg(feature = "metrics")]
                self.metrics.record_promotion();
            }
            #[cfg(feature = "metrics")]
            self.metrics.record_get(true);
            return Some(value);
        }

        let found = self.frequency.get(key);
        #[cfg(feature = "metrics")]
        self.metrics.record_get(found.is_some());
        found
    }

    /// Returns `true` if `key` is resident in either partition's main
    /// store, without touching access state or ghost histories.
    pub fn contains(&self, key: &K) -> bool {
        self.recency.contains_in_main(key) || self.frequency.contains_in_main(key)
    }

    /// Probes both ghost histories for `key` and rebalances on a hit.
    ///
    /// A hit in the recency ghost reads as recency pressure: the frequency
    /// partition is asked to give up one unit of capacity, and only if it
    /// agrees does the recency partition grow. The frequency-ghost case is
    /// symmetric. Returns `true` iff the key was found in (and removed
    /// from) either history.
    fn check_ghosts(&self, key: &K) -> bool {
        if self.recency.check_and_remove_ghost(key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_ghost_hit();
            if self.frequency.shrink_capacity() {
                self.recency.grow_capacity();
                #[cfg(feature = "metrics")]
                self.metrics.record_capacity_transfer();
            }
            return true;
        }
        if self.frequency.check_and_remove_ghost(key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_ghost_hit();
            if self.recency.shrink_capacity() {
                self.frequency.grow_capacity();
                #[cfg(feature = "metrics")]
                self.metrics.record_capacity_transfer();
            }
            return true;
        }
        false
    }

    /// Returns the per-partition capacity both partitions started with.
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Returns the configured promotion threshold.
    pub fn promotion_threshold(&self) -> usize {
        self.promotion_threshold
    }

    /// Returns the total number of resident entries across both main
    /// stores. A key inside its dual-residency window counts twice.
    pub fn len(&self) -> usize {
        self.recency.len() + self.frequency.len()
    }

    /// Returns `true` if neither main store holds an entry.
    pub fn is_empty(&self) -> bool {
        self.recency.is_empty() && self.frequency.is_empty()
    }

    /// Returns the number of entries in the recency partition's main store.
    pub fn recency_len(&self) -> usize {
        self.recency.len()
    }

    /// Returns the number of entries in the frequency partition's main
    /// store.
    pub fn frequency_len(&self) -> usize {
        self.frequency.len()
    }

    /// Returns the recency partition's current capacity.
    pub fn recency_capacity(&self) -> usize {
        self.recency.capacity()
    }

    /// Returns the frequency partition's current capacity.
    pub fn frequency_capacity(&self) -> usize {
        self.frequency.capacity()
    }

    /// Returns the number of keys in the recency partition's ghost history.
    pub fn recency_ghost_len(&self) -> usize {
        self.recency.ghost_len()
    }

    /// Returns the number of keys in the frequency partition's ghost
    /// history.
    pub fn frequency_ghost_len(&self) -> usize {
        self.frequency.ghost_len()
    }

    /// Returns `true` if `key` is resident in the recency main store.
    pub fn recency_contains(&self, key: &K) -> bool {
        self.recency.contains_in_main(key)
    }

    /// Returns `true` if `key` is resident in the frequency main store.
    pub fn frequency_contains(&self, key: &K) -> bool {
        self.frequency.contains_in_main(key)
    }

    /// Empties both partitions' main stores and ghost histories.
    ///
    /// Capacity transfers from earlier rebalances are retained; only the
    /// entries are dropped.
    pub fn clear(&self) {
        self.recency.clear();
        self.frequency.clear();
    }

    /// Returns a point-in-time copy of the operation counters and
    /// occupancy gauges.
    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> AdaptiveMetricsSnapshot {
        let mut snap = self.metrics.snapshot();
        snap.recency_len = self.recency.len();
        snap.frequency_len = self.frequency.len();
        snap.recency_capacity = self.recency.capacity();
        snap.frequency_capacity = self.frequency.capacity();
        snap
    }

    /// Verifies cross-partition consistency, returning the first violated
    /// invariant.
    ///
    /// The combined-capacity check tolerates the zero-capacity shrink
    /// asymmetry: a recency-ghost hit while the frequency partition sits at
    /// capacity 0 grows the total, so the combined capacity may exceed,
    /// but never fall below, twice the initial capacity.
    #[cfg(any(test, debug_assertions))]
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.recency.len() > self.recency.capacity() {
            return Err(InvariantError::new(format!(
                "recency main store over capacity: {} > {}",
                self.recency.len(),
                self.recency.capacity()
            )));
        }
        if self.frequency.len() > self.frequency.capacity() {
            return Err(InvariantError::new(format!(
                "frequency main store over capacity: {} > {}",
                self.frequency.len(),
                self.frequency.capacity()
            )));
        }
        if self.recency.ghost_len() > self.recency.ghost_capacity() {
            return Err(InvariantError::new("recency ghost over capacity"));
        }
        if self.frequency.ghost_len() > self.frequency.ghost_capacity() {
            return Err(InvariantError::new("frequency ghost over capacity"));
        }
        if self.recency.ghost_capacity() != self.initial_capacity
            || self.frequency.ghost_capacity() != self.initial_capacity
        {
            return Err(InvariantError::new(
                "ghost capacity drifted from construction-time capacity",
            ));
        }
        let combined = self.recency.capacity() + self.frequency.capacity();
        if combined < 2 * self.initial_capacity {
            return Err(InvariantError::new(format!(
                "combined capacity shrank: {} < {}",
                combined,
                2 * self.initial_capacity
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.recency.debug_validate_invariants();
        self.frequency.debug_validate_invariants();
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cache_is_empty_with_even_split() {
        let cache: AdaptiveCache<u64, String> = AdaptiveCache::new(10);
        assert!(cache.is_empty());
        assert_eq!(cache.recency_capacity(), 10);
        assert_eq!(cache.frequency_capacity(), 10);
        assert_eq!(cache.promotion_threshold(), DEFAULT_PROMOTION_THRESHOLD);
        cache.debug_validate_invariants();
    }

    #[test]
    fn put_routes_new_keys_to_recency() {
        let cache = AdaptiveCache::new(4);
        cache.put("a", 1);
        assert!(cache.recency_contains(&"a"));
        assert!(!cache.frequency_contains(&"a"));
        assert_eq!(cache.get(&"a"), Some(1));
        cache.debug_validate_invariants();
    }

    #[test]
    fn get_promotes_at_threshold_and_keeps_recency_copy() {
        let cache = AdaptiveCache::with_threshold(4, 3);
        cache.put("x", 7);

        // insert count 1; first get reaches 2, second get reaches 3
        cache.get(&"x");
        assert!(!cache.frequency_contains(&"x"));
        cache.get(&"x");
        assert!(cache.frequency_contains(&"x"));
        assert!(cache.recency_contains(&"x"));
        cache.debug_validate_invariants();
    }

    #[test]
    fn put_routes_to_frequency_once_resident_there() {
        let cache = AdaptiveCache::with_threshold(4, 2);
        cache.put("x", 1);
        cache.get(&"x"); // promoted at count 2

        cache.put("x", 99);
        // the frequency copy took the write; the recency copy still holds
        // the old value and answers get() first
        assert_eq!(cache.get(&"x"), Some(1));
        cache.debug_validate_invariants();
    }

    #[test]
    fn recency_ghost_hit_moves_capacity_toward_recency() {
        let cache = AdaptiveCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3); // evicts "a" to the recency ghost

        assert_eq!(cache.get(&"a"), None); // ghost hit: still a miss
        assert_eq!(cache.recency_capacity(), 3);
        assert_eq!(cache.frequency_capacity(), 1);
        assert_eq!(cache.recency_ghost_len(), 0); // consumed
        cache.debug_validate_invariants();
    }

    #[test]
    fn returning_key_reenters_via_recency() {
        let cache = AdaptiveCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3); // "a" to recency ghost

        cache.put("a", 10); // ghost hit: rebalance, then re-enter via recency
        assert!(cache.recency_contains(&"a"));
        assert!(!cache.frequency_contains(&"a"));
        assert_eq!(cache.get(&"a"), Some(10));
        // capacity moved, so "b" and "c" were not pushed out
        assert!(cache.recency_contains(&"b"));
        assert!(cache.recency_contains(&"c"));
        cache.debug_validate_invariants();
    }

    #[test]
    fn zero_capacity_cache_is_inert() {
        let cache = AdaptiveCache::new(0);
        cache.put("a", 1);
        assert_eq!(cache.get(&"a"), None);
        assert!(cache.is_empty());
        cache.debug_validate_invariants();
    }

    #[test]
    fn clear_drops_entries_but_keeps_moved_capacity() {
        let cache = AdaptiveCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        cache.get(&"a"); // ghost hit: capacity 3/1

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.recency_ghost_len(), 0);
        assert_eq!(cache.recency_capacity(), 3);
        assert_eq!(cache.frequency_capacity(), 1);
        cache.debug_validate_invariants();
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn metrics_track_hits_misses_and_transfers() {
        let cache = AdaptiveCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.get(&"a"), Some(1)); // hit
        cache.put("c", 3); // evicts "b"
        assert_eq!(cache.get(&"b"), None); // miss + ghost hit + transfer

        let snap = cache.metrics();
        assert_eq!(snap.put_calls, 3);
        assert_eq!(snap.get_calls, 2);
        assert_eq!(snap.get_hits, 1);
        assert_eq!(snap.get_misses, 1);
        assert_eq!(snap.ghost_hits, 1);
        assert_eq!(snap.capacity_transfers, 1);
        assert_eq!(snap.recency_capacity, 3);
        assert_eq!(snap.frequency_capacity, 1);
        assert!((snap.hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}
