//! Recency partition of the adaptive engine.
//!
//! A bounded LRU-ordered main store plus a bounded ghost history of evicted
//! keys. New and returning keys enter the engine here; repeated access
//! raises a node's access count until it crosses the promotion threshold,
//! at which point the orchestrator copies the entry into the frequency
//! partition.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                     RecencyPartition<K, V>                           │
//! │                                                                      │
//! │   index: FxHashMap<K, NodeId>     arena: NodeArena<Node<K, V>>       │
//! │   ┌─────────┬────────┐            ┌────────┬───────────────────────┐ │
//! │   │ "page3" │  id_2  │───────────►│  id_2  │ key,val,count,links   │ │
//! │   │ "page1" │  id_0  │───────────►│  id_0  │ key,val,count,links   │ │
//! │   └─────────┴────────┘            └────────┴───────────────────────┘ │
//! │                                                                      │
//! │   main chain:  head ─► [id_2] ◄──► [id_0] ◄── tail                   │
//! │                          MRU              LRU (evicted first)        │
//! │                                                                      │
//! │   ghost: GhostStore<K>   keys of evicted entries, newest first;      │
//! │                          capacity frozen at construction             │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation                 | Time | Notes                                |
//! |---------------------------|------|--------------------------------------|
//! | `put`                     | O(1) | overwrite moves to MRU, no count bump|
//! | `get` / `get_with_promotion` | O(1) | the only access-count growth path |
//! | `check_and_remove_ghost`  | O(1) | consuming probe                      |
//! | `grow_capacity`           | O(1) | unconditional                        |
//! | `shrink_capacity`         | O(1) | may force-evict the LRU tail         |
//!
//! ## Thread Safety
//!
//! One internal mutex guards the main store, ghost history, and capacity
//! counter together; every public method takes `&self` and holds the lock
//! for the duration of the call.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::ds::{GhostStore, NodeArena, NodeId};
use crate::traits::{CachePartition, ReadOnlyPartition};

/// Cache node linked into the recency chain.
#[derive(Debug)]
struct Node<K, V> {
    prev: Option<NodeId>,
    next: Option<NodeId>,
    access_count: u64,
    key: K,
    value: V,
}

/// LRU-ordered half of the adaptive engine, with ghost history.
///
/// # Example
///
/// ```
/// use arckit::policy::recency::RecencyPartition;
///
/// let part = RecencyPartition::new(2, 3);
/// part.put("a", 1);
/// part.put("b", 2);
/// part.put("c", 3); // evicts "a" to the ghost history
///
/// assert_eq!(part.get_with_promotion(&"a"), None);
/// assert!(part.check_and_remove_ghost(&"a"));
/// assert_eq!(part.get_with_promotion(&"b"), Some((2, false)));
/// ```
#[derive(Debug)]
pub struct RecencyPartition<K, V> {
    inner: Mutex<RecencyInner<K, V>>,
}

#[derive(Debug)]
struct RecencyInner<K, V> {
    arena: NodeArena<Node<K, V>>,
    index: FxHashMap<K, NodeId>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    ghost: GhostStore<K>,
    capacity: usize,
    promotion_threshold: u64,
}

impl<K, V> RecencyPartition<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a recency partition with the given main-store `capacity` and
    /// `promotion_threshold` (the access count at which
    /// [`get_with_promotion`](Self::get_with_promotion) starts signalling).
    ///
    /// The ghost history is sized to `capacity` and keeps that size for the
    /// partition's lifetime, even as the main capacity is adjusted.
    pub fn new(capacity: usize, promotion_threshold: usize) -> Self {
        Self {
            inner: Mutex::new(RecencyInner {
                arena: NodeArena::with_capacity(capacity),
                index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
                head: None,
                tail: None,
                ghost: GhostStore::new(capacity),
                capacity,
                promotion_threshold: promotion_threshold as u64,
            }),
        }
    }

    /// Inserts or overwrites `key`.
    ///
    /// An overwrite moves the node to the MRU position without touching its
    /// access count; a fresh insert enters at the MRU position with access
    /// count 1, evicting the LRU tail to the ghost history if the store is
    /// full. Returns `false` iff the capacity is currently 0.
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
                inner.detach(id);
                inner.attach_front(id);
            },
            None => inner.insert_new(key, value),
        }
        true
    }

    /// Looks up `key`, returning its value and whether its access count has
    /// reached the promotion threshold.
    ///
    /// A hit moves the node to the MRU position and increments its access
    /// count; this is the only operation that grows counts in this
    /// partition.
    pub fn get_with_promotion(&self, key: &K) -> Option<(V, bool)> {
        let mut inner = self.inner.lock();
        let id = *inner.index.get(key)?;
        inner.detach(id);
        inner.attach_front(id);

        let threshold = inner.promotion_threshold;
        let node = inner.arena.get_mut(id)?;
        node.access_count += 1;
        let promote = node.access_count >= threshold;
        Some((node.value.clone(), promote))
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

    /// Lowers the main-store capacity by one, force-evicting the LRU tail
    /// first if the store is exactly full.
    ///
    /// Returns `false` without shrinking when the capacity is already 0.
    pub fn shrink_capacity(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.capacity == 0 {
            return false;
        }
        if inner.index.len() == inner.capacity {
            inner.evict_least_recent();
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

    /// Empties the main store and ghost history, keeping the current
    /// capacity.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.arena.clear();
        inner.index.clear();
        inner.head = None;
        inner.tail = None;
        inner.ghost.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let inner = self.inner.lock();
        assert!(inner.index.len() <= inner.capacity);
        assert_eq!(inner.index.len(), inner.arena.len());
        inner.ghost.debug_validate_invariants();

        let mut seen = 0usize;
        let mut prev = None;
        let mut current = inner.head;
        while let Some(id) = current {
            let node = inner.arena.get(id).expect("recency chain names a dead node");
            assert_eq!(node.prev, prev);
            assert_eq!(inner.index.get(&node.key), Some(&id));
            assert!(node.access_count >= 1);
            prev = Some(id);
            current = node.next;
            seen += 1;
            assert!(seen <= inner.arena.len(), "cycle in recency chain");
        }
        assert_eq!(seen, inner.index.len());
        assert_eq!(inner.tail, prev);
    }
}

impl<K, V> RecencyInner<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert_new(&mut self, key: K, value: V) {
        if self.index.len() >= self.capacity {
            self.evict_least_recent();
        }

        let id = self.arena.insert(Node {
            prev: None,
            next: None,
            access_count: 1,
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
        self.attach_front(id);
    }

    fn evict_least_recent(&mut self) {
        let Some(victim) = self.tail else { return };
        self.detach(victim);
        if let Some(node) = self.arena.remove(victim) {
            self.index.remove(&node.key);
            self.ghost.record(node.key);
        }
    }

    fn detach(&mut self, id: NodeId) {
        let (prev, next) = match self.arena.get(id) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(prev_node) = self.arena.get_mut(p) {
                    prev_node.next = next;
                }
            },
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(next_node) = self.arena.get_mut(n) {
                    next_node.prev = prev;
                }
            },
            None => self.tail = prev,
        }

        if let Some(node) = self.arena.get_mut(id) {
            node.prev = None;
            node.next = None;
        }
    }

    fn attach_front(&mut self, id: NodeId) {
        let old_head = self.head;
        if let Some(node) = self.arena.get_mut(id) {
            node.prev = None;
            node.next = old_head;
        } else {
            return;
        }
        match old_head {
            Some(h) => {
                if let Some(head_node) = self.arena.get_mut(h) {
                    head_node.prev = Some(id);
                }
            },
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }
}

impl<K, V> ReadOnlyPartition<K, V> for RecencyPartition<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn contains_in_main(&self, key: &K) -> bool {
        RecencyPartition::contains_in_main(self, key)
    }

    fn len(&self) -> usize {
        RecencyPartition::len(self)
    }

    fn capacity(&self) -> usize {
        RecencyPartition::capacity(self)
    }

    fn ghost_len(&self) -> usize {
        RecencyPartition::ghost_len(self)
    }

    fn ghost_capacity(&self) -> usize {
        RecencyPartition::ghost_capacity(self)
    }
}

impl<K, V> CachePartition<K, V> for RecencyPartition<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) -> bool {
        RecencyPartition::put(self, key, value)
    }

    /// Trait-level `get` discards the promotion signal; the orchestrator
    /// calls [`RecencyPartition::get_with_promotion`] directly.
    fn get(&self, key: &K) -> Option<V> {
        self.get_with_promotion(key).map(|(value, _)| value)
    }

    fn check_and_remove_ghost(&self, key: &K) -> bool {
        RecencyPartition::check_and_remove_ghost(self, key)
    }

    fn grow_capacity(&self) {
        RecencyPartition::grow_capacity(self)
    }

    fn shrink_capacity(&self) -> bool {
        RecencyPartition::shrink_capacity(self)
    }

    fn clear(&self) {
        RecencyPartition::clear(self)
    }
}
