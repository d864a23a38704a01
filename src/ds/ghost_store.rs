//! Bounded history of recently evicted keys.
//!
//! Each cache partition keeps a `GhostStore` recording the keys (no values)
//! it has evicted. The orchestrator probes these histories on every
//! operation: a hit means "this key would have been useful to keep" and
//! triggers a capacity transfer toward the partition that lost it.
//!
//! ## Layout
//!
//! ```text
//!   index: FxHashMap<K, NodeId>       chain over NodeArena<Ghost<K>>
//!   ┌─────────┬────────┐              head ─► [C] ◄──► [B] ◄──► [A] ◄── tail
//!   │  key C  │  id_2  │                  newest                oldest
//!   │  key B  │  id_1  │
//!   └─────────┴────────┘
//! ```
//!
//! `record` evicts the oldest entry once `capacity` keys are tracked; both
//! `record` and `remove` are O(1) average.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::ds::node_arena::{NodeArena, NodeId};

#[derive(Debug)]
struct Ghost<K> {
    key: K,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Bounded keys-only record of a partition's evictions, newest first.
#[derive(Debug)]
pub struct GhostStore<K> {
    arena: NodeArena<Ghost<K>>,
    index: FxHashMap<K, NodeId>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    capacity: usize,
}

impl<K> GhostStore<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a ghost store tracking at most `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            arena: NodeArena::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            head: None,
            tail: None,
            capacity,
        }
    }

    /// Returns the fixed capacity set at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Records `key` as the newest eviction, dropping the oldest tracked
    /// key if the store is full. Re-recording an existing key refreshes it.
    pub fn record(&mut self, key: K) {
        if self.capacity == 0 {
            return;
        }

        if let Some(&id) = self.index.get(&key) {
            self.detach(id);
            self.attach_front(id);
            return;
        }

        if self.arena.len() >= self.capacity {
            self.drop_oldest();
        }

        let id = self.arena.insert(Ghost {
            key: key.clone(),
            prev: None,
            next: None,
        });
        self.attach_front(id);
        self.index.insert(key, id);
    }

    /// Removes `key` from the history; returns `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(id) = self.index.remove(key) else {
            return false;
        };
        self.detach(id);
        self.arena.remove(id);
        true
    }

    /// Forgets all tracked keys.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    fn drop_oldest(&mut self) {
        let Some(id) = self.tail else { return };
        self.detach(id);
        if let Some(ghost) = self.arena.remove(id) {
            self.index.remove(&ghost.key);
        }
    }

    fn detach(&mut self, id: NodeId) {
        let (prev, next) = match self.arena.get(id) {
            Some(ghost) => (ghost.prev, ghost.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(prev_ghost) = self.arena.get_mut(p) {
                    prev_ghost.next = next;
                }
            },
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(next_ghost) = self.arena.get_mut(n) {
                    next_ghost.prev = prev;
                }
            },
            None => self.tail = prev,
        }

        if let Some(ghost) = self.arena.get_mut(id) {
            ghost.prev = None;
            ghost.next = None;
        }
    }

    fn attach_front(&mut self, id: NodeId) {
        let old_head = self.head;
        if let Some(ghost) = self.arena.get_mut(id) {
            ghost.prev = None;
            ghost.next = old_head;
        } else {
            return;
        }
        match old_head {
            Some(h) => {
                if let Some(head_ghost) = self.arena.get_mut(h) {
                    head_ghost.prev = Some(id);
                }
            },
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.arena.len(), self.index.len());
        assert!(self.arena.len() <= self.capacity);

        let mut seen = 0usize;
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let ghost = self.arena.get(id).expect("ghost chain names a dead node");
            assert_eq!(ghost.prev, prev);
            assert_eq!(self.index.get(&ghost.key), Some(&id));
            prev = Some(id);
            current = ghost.next;
            seen += 1;
            assert!(seen <= self.arena.len(), "cycle in ghost chain");
        }
        assert_eq!(seen, self.arena.len());
        assert_eq!(self.tail, prev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_overflow_drops_oldest() {
        let mut ghost = GhostStore::new(2);
        ghost.record("a");
        ghost.record("b");
        ghost.record("c");

        assert!(!ghost.contains(&"a"));
        assert!(ghost.contains(&"b"));
        assert!(ghost.contains(&"c"));
        assert_eq!(ghost.len(), 2);
        ghost.debug_validate_invariants();
    }

    #[test]
    fn record_existing_refreshes_age() {
        let mut ghost = GhostStore::new(2);
        ghost.record("a");
        ghost.record("b");
        ghost.record("a");
        ghost.record("c");

        // "b" was oldest after the refresh, so it is the one dropped.
        assert!(ghost.contains(&"a"));
        assert!(!ghost.contains(&"b"));
        assert!(ghost.contains(&"c"));
        ghost.debug_validate_invariants();
    }

    #[test]
    fn remove_is_consuming() {
        let mut ghost = GhostStore::new(4);
        ghost.record("a");
        assert!(ghost.remove(&"a"));
        assert!(!ghost.contains(&"a"));
        assert!(!ghost.remove(&"a"));
        assert!(ghost.is_empty());
        ghost.debug_validate_invariants();
    }

    #[test]
    fn remove_from_middle_keeps_chain_intact() {
        let mut ghost = GhostStore::new(4);
        ghost.record("a");
        ghost.record("b");
        ghost.record("c");
        assert!(ghost.remove(&"b"));
        ghost.debug_validate_invariants();

        ghost.record("d");
        ghost.record("e");
        assert!(ghost.contains(&"a")); // still room after the removal
        ghost.record("f");
        // at capacity 4 the "f" record drops "a", the oldest survivor
        assert!(!ghost.contains(&"a"));
        assert!(ghost.contains(&"c"));
        assert!(ghost.contains(&"d"));
        assert!(ghost.contains(&"e"));
        assert!(ghost.contains(&"f"));
        ghost.debug_validate_invariants();
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut ghost = GhostStore::new(0);
        ghost.record("a");
        assert!(ghost.is_empty());
        assert!(!ghost.contains(&"a"));
        ghost.debug_validate_invariants();
    }

    #[test]
    fn clear_resets_state() {
        let mut ghost = GhostStore::new(2);
        ghost.record("a");
        ghost.record("b");
        ghost.clear();
        assert!(ghost.is_empty());
        assert!(!ghost.contains(&"a"));
        ghost.debug_validate_invariants();
    }
}
