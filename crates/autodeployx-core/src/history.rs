//! Bounded, most-recent-first history ledgers.
//!
//! All three ledgers in the system (builds, logs, rollouts) share this
//! structure: appends insert at the front and truncate to a fixed capacity
//! in the same operation, so the capacity invariant holds after every call
//! and eviction can never be observed part-way through.

use std::collections::VecDeque;

/// A fixed-capacity, most-recent-first append log.
#[derive(Debug, Clone)]
pub struct History<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    /// Creates an empty history with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be non-zero");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an item at the front, evicting the oldest entries beyond
    /// capacity. One indivisible operation.
    pub fn push(&mut self, item: T) {
        self.items.push_front(item);
        self.items.truncate(self.capacity);
    }

    /// Returns the first `min(limit, len)` items, most recent first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<T>
    where
        T: Clone,
    {
        self.items.iter().take(limit).cloned().collect()
    }

    /// Iterates over all retained items, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Number of retained items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when nothing has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The fixed capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<'a, T> IntoIterator for &'a History<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_most_recent_first_order() {
        let mut history = History::new(10);
        for n in 1..=4 {
            history.push(n);
        }
        assert_eq!(history.recent(10), vec![4, 3, 2, 1]);
    }

    #[test]
    fn push_beyond_capacity_evicts_the_oldest() {
        let mut history = History::new(3);
        for n in 1..=7 {
            history.push(n);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.recent(10), vec![7, 6, 5]);
    }

    #[test]
    fn recent_honors_limit_and_available_length() {
        let mut history = History::new(5);
        history.push("a");
        history.push("b");
        assert_eq!(history.recent(1), vec!["b"]);
        assert_eq!(history.recent(50), vec!["b", "a"]);
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn zero_capacity_is_rejected() {
        let _ = History::<u8>::new(0);
    }
}
