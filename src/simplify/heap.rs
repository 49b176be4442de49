//! Binary min-heap over item ids with changeable keys.

use num_traits::Float;
use std::cmp::Ordering;

const ABSENT: usize = usize::MAX;

/// A min-heap of item ids `0..capacity`, each carrying a key.
///
/// A reverse index from item to heap slot lets the key of any queued item
/// be changed in `O(log n)`. Equal keys pop in increasing item order.
#[derive(Debug, Clone)]
pub struct IndexedMinHeap<F> {
    heap: Vec<usize>,
    slot: Vec<usize>,
    keys: Vec<F>,
}

impl<F: Float> IndexedMinHeap<F> {
    /// An empty heap accepting items `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            slot: vec![ABSENT; capacity],
            keys: vec![F::infinity(); capacity],
        }
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if no item is queued.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns true if `item` is queued.
    pub fn contains(&self, item: usize) -> bool {
        self.slot[item] != ABSENT
    }

    /// Key of `item`, or `None` if it is not queued.
    pub fn key(&self, item: usize) -> Option<F> {
        self.contains(item).then(|| self.keys[item])
    }

    /// Smallest queued item and its key.
    pub fn peek(&self) -> Option<(usize, F)> {
        self.heap.first().map(|&item| (item, self.keys[item]))
    }

    /// Queues `item`, or changes its key if already queued.
    pub fn push(&mut self, item: usize, key: F) {
        if self.contains(item) {
            self.update(item, key);
            return;
        }
        self.keys[item] = key;
        self.slot[item] = self.heap.len();
        self.heap.push(item);
        self.sift_up(self.heap.len() - 1);
    }

    /// Changes the key of a queued item. Does nothing for other items.
    pub fn update(&mut self, item: usize, key: F) {
        let pos = self.slot[item];
        if pos == ABSENT {
            return;
        }
        let old = self.keys[item];
        self.keys[item] = key;
        if key < old {
            self.sift_up(pos);
        } else {
            self.sift_down(pos);
        }
    }

    /// Removes and returns the smallest item and its key.
    pub fn pop(&mut self) -> Option<(usize, F)> {
        let last = self.heap.len().checked_sub(1)?;
        self.swap(0, last);
        let item = self.heap.pop()?;
        self.slot[item] = ABSENT;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((item, self.keys[item]))
    }

    fn less(&self, a: usize, b: usize) -> bool {
        let (ia, ib) = (self.heap[a], self.heap[b]);
        match self.keys[ia].partial_cmp(&self.keys[ib]) {
            Some(Ordering::Less) => true,
            Some(Ordering::Greater) => false,
            _ => ia < ib,
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slot[self.heap[a]] = a;
        self.slot[self.heap[b]] = b;
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.less(pos, parent) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let n = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            if left >= n {
                break;
            }
            let right = left + 1;
            let child = if right < n && self.less(right, left) {
                right
            } else {
                left
            };
            if !self.less(child, pos) {
                break;
            }
            self.swap(pos, child);
            pos = child;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_key_order() {
        let mut heap = IndexedMinHeap::new(6);
        for (item, key) in [(0, 5.0), (1, 3.0), (2, 9.0), (3, 1.0), (4, 3.0)] {
            heap.push(item, key);
        }
        assert_eq!(heap.len(), 5);
        assert_eq!(heap.peek(), Some((3, 1.0)));
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|(i, _)| i)).collect();
        assert_eq!(order, vec![3, 1, 4, 0, 2]);
        assert!(heap.is_empty());
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn test_update_moves_both_ways() {
        let mut heap = IndexedMinHeap::new(4);
        heap.push(0, 1.0);
        heap.push(1, 2.0);
        heap.push(2, 3.0);
        heap.update(2, 0.5);
        assert_eq!(heap.peek(), Some((2, 0.5)));
        heap.update(2, 10.0);
        assert_eq!(heap.pop(), Some((0, 1.0)));
        assert_eq!(heap.pop(), Some((1, 2.0)));
        assert_eq!(heap.key(2), Some(10.0));
        assert!(!heap.contains(0));
        heap.update(0, -1.0);
        assert_eq!(heap.pop(), Some((2, 10.0)));
    }
}
