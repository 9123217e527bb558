// In-memory session history. Insertion ordered, capped, oldest evicted first.
// Viewing an entry does not change its position.

use std::collections::VecDeque;

use crate::model::HistoryEntry;

#[derive(Debug)]
pub struct SessionHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl SessionHistory {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        SessionHistory {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append at the end, dropping the oldest entry first when full.
    pub fn append(&mut self, entry: HistoryEntry) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Entries oldest first, most recent last.
    pub fn list(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// User-facing selection: `1` is the most recently added entry.
    pub fn select(&self, position: usize) -> Option<&HistoryEntry> {
        if position == 0 || position > self.entries.len() {
            return None;
        }
        self.entries.get(self.entries.len() - position)
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }
}
