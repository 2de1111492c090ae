use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// Evicted items, oldest first.
///
/// `stored ++ live` is the full conversation order. Evicted items are older than everything still
/// live but newer than everything already stored, so eviction appends them at the back, and
/// restoration takes from the back too (the items directly above the live window).
#[derive(Clone, Debug)]
pub struct StoredBuffer<K> {
    items: VecDeque<K>,
}

impl<K> Default for StoredBuffer<K> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<K> StoredBuffer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds `evicted` (already in conversation order) as the newest stored items.
    pub fn push_newest(&mut self, evicted: Vec<K>) {
        self.items.extend(evicted);
    }

    /// Removes and returns the newest `count` items, in conversation order.
    pub fn take_newest(&mut self, count: usize) -> Vec<K> {
        let count = count.min(self.items.len());
        let split = self.items.len() - count;
        self.items.split_off(split).into_iter().collect()
    }

    /// Drops everything without handing items back.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.items.iter()
    }
}
