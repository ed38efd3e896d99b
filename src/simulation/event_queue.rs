//! Sorted pending-item queue
//!
//! Items are kept in ascending key order. Items with equal keys come out in
//! the order they were inserted.

use sorted_vec::SortedVec;
use std::cmp::Ordering;

/// One queued item together with its ordering data
struct Entry<K, T> {
    key: K,
    seq: u64,
    item: T,
}

impl<K: Ord, T> PartialEq for Entry<K, T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}

impl<K: Ord, T> Eq for Entry<K, T> {}

impl<K: Ord, T> PartialOrd for Entry<K, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord, T> Ord for Entry<K, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-ordered queue with a stable tie-break
///
/// Insert is O(log n) to locate plus O(n) to shift, pop-min is O(n) shift.
/// Both are fine for the few dozen events a junction keeps pending.
pub struct MinQueue<K: Ord, T> {
    entries: SortedVec<Entry<K, T>>,
    next_seq: u64,
}

impl<K: Ord, T> Default for MinQueue<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, T> MinQueue<K, T> {
    pub fn new() -> Self {
        Self {
            entries: SortedVec::new(),
            next_seq: 0,
        }
    }

    /// Insert an item after every existing item whose key is not greater
    pub fn insert(&mut self, key: K, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(Entry { key, seq, item });
    }

    /// Remove and return the smallest item, if any
    pub fn pop_min(&mut self) -> Option<(K, T)> {
        if self.entries.is_empty() {
            return None;
        }
        let entry = self.entries.remove_index(0);
        Some((entry.key, entry.item))
    }

    pub fn peek_key(&self) -> Option<&K> {
        self.entries.first().map(|entry| &entry.key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the queued items in the order they would be popped
    pub fn iter(&self) -> impl Iterator<Item = (&K, &T)> {
        self.entries.iter().map(|entry| (&entry.key, &entry.item))
    }
}

