//! Insertion-ordered set with O(log n) removal
//!
//! Keys live in numbered slots. Slot numbers only grow, so iterating the slot
//! map yields insertion order, and removing a key just drops its slot.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct OrderedIndex<K> {
    slots: BTreeMap<u64, K>,
    positions: HashMap<K, u64>,
    next_slot: u64,
}

impl<K> Default for OrderedIndex<K> {
    fn default() -> Self {
        Self {
            slots: BTreeMap::new(),
            positions: HashMap::new(),
            next_slot: 0,
        }
    }
}

impl<K: Clone + Eq + Hash> OrderedIndex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key`. Returns false and leaves the index untouched if present.
    pub fn insert(&mut self, key: K) -> bool {
        if self.positions.contains_key(&key) {
            return false;
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        self.slots.insert(slot, key.clone());
        self.positions.insert(key, slot);
        true
    }

    /// Remove `key`, keeping every other key in its relative order
    pub fn remove(&mut self, key: &K) -> bool {
        match self.positions.remove(key) {
            Some(slot) => {
                self.slots.remove(&slot);
                true
            }
            None => false,
        }
    }

    /// Remove `key` and move the last key into its slot
    pub fn swap_remove(&mut self, key: &K) -> bool {
        let Some(slot) = self.positions.remove(key) else {
            return false;
        };
        self.slots.remove(&slot);

        let tail = match self.slots.last_key_value() {
            Some((&tail, _)) if tail > slot => tail,
            _ => return true,
        };
        if let Some(moved) = self.slots.remove(&tail) {
            self.positions.insert(moved.clone(), slot);
            self.slots.insert(slot, moved);
        }
        true
    }

    pub fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.slots.values()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.positions.clear();
        self.next_slot = 0;
    }
}
