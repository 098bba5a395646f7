use std::collections::{HashSet, VecDeque};

/// Bounded recency buffer of event ids that were already delivered.
///
/// Holds at most `capacity` ids; pushing past that evicts the oldest first.
#[derive(Debug, Clone)]
pub struct SeenEventWindow {
    capacity: usize,
    order: VecDeque<u64>,
    index: HashSet<u64>,
}

impl SeenEventWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            index: HashSet::with_capacity(capacity),
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.index.contains(&id)
    }

    /// Records `id` as seen. Ids already in the window are left where they are.
    pub fn push(&mut self, id: u64) {
        if self.capacity == 0 || !self.index.insert(id) {
            return;
        }
        self.order.push_back(id);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.index.remove(&evicted);
            }
        }
    }

    pub fn extend<I: IntoIterator<Item = u64>>(&mut self, ids: I) {
        for id in ids {
            self.push(id);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ids oldest first.
    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.order.iter().copied()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.index.clear();
    }
}
