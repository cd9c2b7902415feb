//! Bounded FIFO windows.

use std::collections::VecDeque;

/// A fixed-capacity window over the most recent observations.
///
/// Pushing onto a full window evicts the oldest entry, so `len()` never
/// exceeds `capacity()`. The window makes no assumption about arrival
/// timing; it simply holds the last `capacity` values it was given.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> HistoryBuffer<T> {
    /// Create an empty window. A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest one if the window is full.
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(value);
        evicted
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn newest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fills_then_reports_full() {
        let mut window = HistoryBuffer::new(3);
        assert!(window.is_empty());
        window.push(1);
        window.push(2);
        assert!(!window.is_full());
        window.push(3);
        assert!(window.is_full());
        assert_eq!(window.oldest(), Some(&1));
        assert_eq!(window.newest(), Some(&3));
    }

    #[test]
    fn push_on_full_window_evicts_oldest() {
        let mut window = HistoryBuffer::new(2);
        assert_eq!(window.push('a'), None);
        assert_eq!(window.push('b'), None);
        assert_eq!(window.push('c'), Some('a'));
        assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec!['b', 'c']);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut window = HistoryBuffer::new(0);
        assert_eq!(window.capacity(), 1);
        window.push(7);
        assert!(window.is_full());
    }

    proptest! {
        #[test]
        fn keeps_most_recent_capacity_values_in_order(capacity in 1usize..32, extra in 0usize..64) {
            let mut window = HistoryBuffer::new(capacity);
            let total = capacity + extra;
            for value in 0..total {
                window.push(value);
                prop_assert!(window.len() <= capacity);
            }

            prop_assert_eq!(window.len(), capacity);
            let kept: Vec<usize> = window.iter().copied().collect();
            let expected: Vec<usize> = (total - capacity..total).collect();
            prop_assert_eq!(kept, expected);
        }
    }
}
