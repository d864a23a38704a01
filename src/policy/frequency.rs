//! Frequency partition of the adaptive engine.
//!
//! A bounded main store bucketed by access count, plus a bounded ghost
//! history of evicted keys. Entries arrive here when the orchestrator
//! promotes a hot key out of the recency partition; eviction always takes
//! the oldest node of the lowest-count bucket, so one-shot promotions age
//! out before established hot keys.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                    FrequencyPartition<K, V>                          │
//! │                                                                      │
//! │   index: FxHashMap<K, NodeId>     arena: NodeArena<Node<K, V>>       │
//! │                                                                      │
//! │   buckets: BTreeMap<u64, Bucket>   (count → FIFO chain)              │
//! │                                                                      │
//! │   min_freq = 1                                                       │
//! │        │                                                             │
//! │        ▼                                                             │
//! │   count=1: head ─► [id_1] ◄──► [id_2] ◄── tail   (oldest evicted     │
//! │   count=3: head ─► [id_0] ◄── tail                first)             │
//! │                                                                      │
//! │   ghost: GhostStore<K>   keys of evicted entries; capacity frozen    │
//! │                          at construction                             │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The bucket map is ordered so that advancing the tracked minimum after an
//! eviction is just the map's first key; buckets are removed the moment
//! they empty, keeping the map non-empty-by-construction.
//!
//! ## Operations
//!
//! | Operation                | Time     | Notes                              |
//! |--------------------------|----------|------------------------------------|
//! | `put`                    | O(log b) | overwrite re-buckets (counts as an access) |
//! | `get`                    | O(log b) | unlink, bump count, append to next bucket  |
//! | `check_and_remove_ghost` | O(1)     | consuming probe                    |
//! | `grow_capacity`          | O(1)     | unconditional                      |
//! | `shrink_capacity`        | O(log b) | may force-evict; no-op success at 0|
//!
//! b = number of distinct access counts, small in practice.
//!
//! ## Thread Safety
//!
//! One internal mutex guards the buckets, index, ghost history, and
//! capacity counter; every public method takes `&self`.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::hash::Hash;

use crate::ds::{GhostStore, NodeArena, NodeId};
use crate::traits::{CachePartition, ReadOnlyPartition};

/// Cache node linked into its access-count bucket.
#[derive(Debug)]
struct Node<K, V> {
    prev: Option<NodeId>,
    next: Option<NodeId>,
    access_count: u64,
    key: K,
    value: V,
}

/// FIFO chain of the nodes sharing one access count.
#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

/// Access-count-bucketed half of the adaptive engine, with ghost history.
///
/// # Example
///
/// ```
/// use arckit::policy::frequency::FrequencyPartition;
///
/// let part = FrequencyPartition::new(2);
/// part.put("a", 1);
/// part.put("b", 2);
/// part.get(&"a"); // "a" now outranks "b"
///
/// part.put("c", 3); // evicts "b", the oldest minimum-count node
/// assert!(!part.contains_in_main(&"b"));
/// assert!(part.check_and_remove_ghost(&"b"));
/// ```
#[derive(Debug)]
pub struct FrequencyPartition<K, V> {
    inner: Mutex<FrequencyInner<K, V>>,
}

#[derive(Debug)]
struct FrequencyInner<K, V> {
    arena: NodeArena<Node<K, V>>,
    index: FxHashMap<K, NodeId>,
    buckets: BTreeMap<u64, Bucket>,
    min_freq: u64,
    ghost: GhostStore<K>,
    capacity: usize,
}

impl<K, V> FrequencyPartition<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a frequency partition with the given main-store `capacity`.
    ///
    /// The ghost history is sized to `capacity` and keeps that size for the
    /// partition's lifetime, even as the main capacity is adjusted.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(FrequencyInner {
                arena: NodeArena::with_capacity(capacity),
                index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
                buckets: BTreeMap::new(),
                min_freq: 0,
                ghost: GhostStore::new(capacity),
                capacity,
            }),
        }
    }

    /// Inserts or overwrites `key`.
    ///
    /// An overwrite re-buckets the node as if it had been accessed. A fresh
    /// insert lands in the count-1 bucket (evicting the oldest
    /// minimum-count node first if the store is full) and resets the
    /// tracked minimum to 1. Returns `false` iff the capacity is
    /// currently 0.
    pub fn put(&self, key: K, value: V) -> bool {
        let mut inner = self.inner.lock();
        if inner.capacity == 0 {
            return false;
        }

        match inner.index.get(&key) {
            Some(&id) => {
                if let Some(node) = inner.arena.get_mut(id) {
                    node.value = value;
                }
                inner.bump_frequency(id);
            },
            None => inner.insert_new(key, value),
        }
        true
    }

    /// Looks up `key`, bumping its access count and re-bucketing it on a
    /// hit.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let id = *inner.index.get(key)?;
        inner.bump_frequency(id);
        inner.arena.get(id).map(|node| node.value.clone())
    }

    /// Returns `true` if `key` is resident in the main store.
    pub fn contains_in_main(&self, key: &K) -> bool {
        self.inner.lock().index.contains_key(key)
    }

    /// Probes the ghost history for `key`, removing it on a hit.
    pub fn check_and_remove_ghost(&self, key: &K) -> bool {
        self.inner.lock().ghost.remove(key)
    }

    /// Raises the main-store capacity by one.
    pub fn grow_capacity(&self) {
        self.inner.lock().capacity += 1;
    }

    /// Lowers the main-store capacity by one, force-evicting the oldest
    /// minimum-count node first if the store is exactly full.
    ///
    /// At capacity 0 this reports `true` without doing anything, the
    /// opposite of the recency partition's answer. The orchestrator's
    /// rebalancing depends on the difference, so it must stay this way.
    pub fn shrink_capacity(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.capacity == 0 {
            return true;
        }
        if inner.index.len() == inner.capacity {
            inner.evict_least_frequent();
        }
        inner.capacity -= 1;
        true
    }

    /// Returns the number of entries in the main store.
    pub fn len(&self) -> usize {
        self.inner.lock().index.len()
    }

    /// Returns `true` if the main store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the current main-store capacity.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    /// Returns the number of keys in the ghost history.
    pub fn ghost_len(&self) -> usize {
        self.inner.lock().ghost.len()
    }

    /// Returns the ghost history's fixed capacity.
    pub fn ghost_capacity(&self) -> usize {
        self.inner.lock().ghost.capacity()
    }

    /// Returns the access count currently recorded for `key`, without
    /// touching it.
    pub fn access_count(&self, key: &K) -> Option<u64> {
        let inner = self.inner.lock();
        let id = *inner.index.get(key)?;
        inner.arena.get(id).map(|node| node.access_count)
    }

    /// Empties the main store and ghost history, keeping the current
    /// capacity.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.arena.clear();
        inner.index.clear();
        inner.buckets.clear();
        inner.min_freq = 0;
        inner.ghost.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let inner = self.inner.lock();
        assert!(inner.index.len() <= inner.capacity);
        assert_eq!(inner.index.len(), inner.arena.len());
        inner.ghost.debug_validate_invariants();

        if let Some((&first, _)) = inner.buckets.first_key_value() {
            assert_eq!(inner.min_freq, first, "tracked minimum is stale");
        }

        let mut chained = 0usize;
        for (&freq, bucket) in &inner.buckets {
            assert!(bucket.head.is_some(), "empty bucket left in map");
            let mut prev = None;
            let mut current = bucket.head;
            while let Some(id) = current {
                let node = inner.arena.get(id).expect("bucket chain names a dead node");
                assert_eq!(node.access_count, freq);
                assert_eq!(node.prev, prev);
                assert_eq!(inner.index.get(&node.key), Some(&id));
                prev = Some(id);
                current = node.next;
                chained += 1;
                assert!(chained <= inner.arena.len(), "cycle in bucket chain");
            }
            assert_eq!(bucket.tail, prev);
        }
        assert_eq!(chained, inner.index.len());
    }
}

impl<K, V> FrequencyInner<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert_new(&mut self, key: K, value: V) {
        if self.index.len() >= self.capacity {
            self.evict_least_frequent();
        }

        let id = self.arena.insert(Node {
            prev: None,
            next: None,
            access_count: 1,
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
        self.append_to_bucket(id, 1);
        self.min_freq = 1;
    }

    fn bump_frequency(&mut self, id: NodeId) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        let old_freq = node.access_count;
        node.access_count += 1;
        let new_freq = node.access_count;

        let emptied = self.unlink_from_bucket(id, old_freq);
        if emptied && old_freq == self.min_freq {
            self.min_freq = new_freq;
        }
        self.append_to_bucket(id, new_freq);
    }

    fn evict_least_frequent(&mut self) {
        if self.buckets.is_empty() {
            return;
        }
        let min = self.min_freq;
        let Some(bucket) = self.buckets.get(&min) else {
            return;
        };
        let Some(victim) = bucket.head else { return };

        let emptied = self.unlink_from_bucket(victim, min);
        if emptied {
            if let Some((&next_min, _)) = self.buckets.first_key_value() {
                self.min_freq = next_min;
            }
        }

        if let Some(node) = self.arena.remove(victim) {
            self.index.remove(&node.key);
            self.ghost.record(node.key);
        }
    }

    /// Detaches `id` from the chain of bucket `freq`; returns `true` if
    /// that emptied the bucket (which is then dropped from the map).
    fn unlink_from_bucket(&mut self, id: NodeId, freq: u64) -> bool {
        let (prev, next) = match self.arena.get(id) {
            Some(node) => (node.prev, node.next),
            None => return false,
        };

        if let Some(p) = prev {
            if let Some(prev_node) = self.arena.get_mut(p) {
                prev_node.next = next;
            }
        }
        if let Some(n) = next {
            if let Some(next_node) = self.arena.get_mut(n) {
                next_node.prev = prev;
            }
        }
        if let Some(node) = self.arena.get_mut(id) {
            node.prev = None;
            node.next = None;
        }

        let Some(bucket) = self.buckets.get_mut(&freq) else {
            return false;
        };
        if bucket.head == Some(id) {
            bucket.head = next;
        }
        if bucket.tail == Some(id) {
            bucket.tail = prev;
        }
        if bucket.head.is_none() {
            self.buckets.remove(&freq);
            true
        } else {
            false
        }
    }

    /// Appends `id` to the tail of bucket `freq`, creating the bucket if
    /// needed. Newest-at-tail gives the FIFO tie-break among equal counts.
    fn append_to_bucket(&mut self, id: NodeId, freq: u64) {
        let bucket = self.buckets.entry(freq).or_default();
        let old_tail = bucket.tail;
        bucket.tail = Some(id);
        if bucket.head.is_none() {
            bucket.head = Some(id);
        }

        if let Some(t) = old_tail {
            if let Some(tail_node) = self.arena.get_mut(t) {
                tail_node.next = Some(id);
            }
        }
        if let Some(node) = self.arena.get_mut(id) {
            node.prev = old_tail;
            node.next = None;
        }
    }
}

impl<K, V> ReadOnlyPartition<K, V> for FrequencyPartition<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn contains_in_main(&self, key: &K) -> bool {
        FrequencyPartition::contains_in_main(self, key)
    }

    fn len(&self) -> usize {
        FrequencyPartition::len(self)
    }

    fn capacity(&self) -> usize {
        FrequencyPartition::capacity(self)
    }

    fn ghost_len(&self) -> usize {
        FrequencyPartition::ghost_len(self)
    }

    fn ghost_capacity(&self) -> usize {
        FrequencyPartition::ghost_capacity(self)
    }
}

impl<K, V> CachePartition<K, V> for FrequencyPartition<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) -> bool {
        FrequencyPartition::put(self, key, value)
    }

    fn get(&self, key: &K) -> Option<V> {
        FrequencyPartition::get(self, key)
    }

    fn check_and_remove_ghost(&self, key: &K) -> bool {
        FrequencyPartition::check_and_remove_ghost(self, key)
    }

    fn grow_capacity(&self) {
        FrequencyPartition::grow_capacity(self)
    }

    fn shrink_capacity(&self) -> bool {
        FrequencyPartition::shrink_capacity(self)
    }

    fn clear(&self) {
        FrequencyPartition::clear(self)
    }
}
