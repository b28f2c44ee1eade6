//! Array-backed binary min-heap with position tracking.
//!
//! Unlike `std::collections::BinaryHeap`, every node remembers where it
//! currently sits in the heap array. The position is rewritten on every swap
//! during sift-up/sift-down, which turns "remove this particular entry" and
//! "this entry's priority changed" into O(log n) operations instead of a
//! linear search or a lazy tombstone.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Node<T>>)               heap: Vec<SlotId>
//!   ┌────────┬──────────────────────────┐    ┌─────┬─────┬─────┬─────┐
//!   │ SlotId │ Node { value, pos }      │    │  0  │  1  │  2  │  3  │
//!   ├────────┼──────────────────────────┤    ├─────┼─────┼─────┼─────┤
//!   │ id_0   │ { value: (w=4), pos: 2 } │    │id_2 │id_3 │id_0 │id_1 │
//!   │ id_1   │ { value: (w=5), pos: 3 } │    └─────┴─────┴─────┴─────┘
//!   │ id_2   │ { value: (w=0), pos: 0 } │
//!   │ id_3   │ { value: (w=1), pos: 1 } │    arena[heap[i]].pos == i
//!   └────────┴──────────────────────────┘
//!
//!                  (w=0) id_2
//!                 /          \
//!          (w=1) id_3      (w=4) id_0
//!           /
//!    (w=5) id_1
//! ```
//!
//! ## Operations
//!
//! | Operation        | Description                                  | Complexity |
//! |------------------|----------------------------------------------|------------|
//! | `push`           | Append and sift up                           | O(log n)   |
//! | `pop`            | Remove the minimum                           | O(log n)   |
//! | `remove(id)`     | Swap with last, shrink, re-sift              | O(log n)   |
//! | `update(id, f)`  | Mutate in place, re-sift in either direction | O(log n)   |
//! | `min_excluding`  | Minimum other than a given node              | O(1)       |
//!
//! Ordering comes from [`HeapPriority::priority`]. Priorities should be total
//! and unique (e.g. a `(score, sequence)` pair) if callers need a
//! deterministic victim among equal scores.

use crate::ds::slot_arena::{SlotArena, SlotId};

/// Supplies the ordering key for values stored in an [`IndexedMinHeap`].
pub trait HeapPriority {
    type Priority: Ord;

    fn priority(&self) -> Self::Priority;
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    pos: usize,
}

/// Min-heap whose nodes can be addressed, mutated, and removed by [`SlotId`].
#[derive(Debug)]
pub struct IndexedMinHeap<T> {
    arena: SlotArena<Node<T>>,
    heap: Vec<SlotId>,
}

impl<T: HeapPriority> IndexedMinHeap<T> {
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            heap: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.arena.contains(id)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    /// Current heap-array position of `id`.
    pub fn position(&self, id: SlotId) -> Option<usize> {
        self.arena.get(id).map(|node| node.pos)
    }

    /// Id of the minimum node.
    pub fn peek_id(&self) -> Option<SlotId> {
        self.heap.first().copied()
    }

    pub fn peek(&self) -> Option<&T> {
        self.peek_id().and_then(|id| self.get(id))
    }

    /// Id of the smallest node other than `excluded`.
    ///
    /// The runner-up of a binary min-heap is always one of the root's
    /// children, so this never scans.
    pub fn min_excluding(&self, excluded: SlotId) -> Option<SlotId> {
        let root = self.peek_id()?;
        if root != excluded {
            return Some(root);
        }
        match (self.heap.get(1), self.heap.get(2)) {
            (Some(&left), Some(_)) if self.less(1, 2) => Some(left),
            (Some(_), Some(&right)) => Some(right),
            (Some(&left), None) => Some(left),
            _ => None,
        }
    }

    pub fn push(&mut self, value: T) -> SlotId {
        let pos = self.heap.len();
        let id = self.arena.insert(Node { value, pos });
        self.heap.push(id);
        self.sift_up(pos);
        id
    }

    pub fn pop(&mut self) -> Option<T> {
        let id = self.peek_id()?;
        self.remove(id)
    }

    /// Removes `id` from anywhere in the heap.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let pos = self.arena.get(id)?.pos;
        let last = self.heap.len() - 1;
        if pos != last {
            self.swap(pos, last);
        }
        self.heap.pop();
        if pos < self.heap.len() {
            self.restore(pos);
        }
        self.arena.remove(id).map(|node| node.value)
    }

    /// Applies `f` to the value at `id` and restores heap order.
    ///
    /// Returns `None` if `id` is not in the heap.
    pub fn update<R>(&mut self, id: SlotId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let node = self.arena.get_mut(id)?;
        let result = f(&mut node.value);
        let pos = node.pos;
        self.restore(pos);
        Some(result)
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.heap.clear();
    }

    /// Iterates nodes in heap-array order (not sorted).
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.heap.iter().map(|&id| (id, &self.arena[id].value))
    }

    fn priority_at(&self, pos: usize) -> T::Priority {
        self.arena[self.heap[pos]].value.priority()
    }

    fn less(&self, a: usize, b: usize) -> bool {
        self.priority_at(a) < self.priority_at(b)
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        let (id_a, id_b) = (self.heap[a], self.heap[b]);
        self.arena[id_a].pos = a;
        self.arena[id_b].pos = b;
    }

    fn restore(&mut self, pos: usize) {
        if pos > 0 && self.less(pos, (pos - 1) / 2) {
            self.sift_up(pos);
        } else {
            self.sift_down(pos);
        }
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
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let smallest = if right < len && self.less(right, left) {
                right
            } else {
                left
            };
            if !self.less(smallest, pos) {
                break;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
    }

    /// Checks position bookkeeping and the heap property.
    pub fn validate(&self) -> Result<(), String> {
        if self.arena.len() != self.heap.len() {
            return Err(format!(
                "{} nodes allocated but {} in heap",
                self.arena.len(),
                self.heap.len()
            ));
        }
        for (pos, &id) in self.heap.iter().enumerate() {
            let node = self
                .arena
                .get(id)
                .ok_or_else(|| format!("heap slot {pos} points at a vacant node"))?;
            if node.pos != pos {
                return Err(format!(
                    "node {} records position {} but sits at {}",
                    id.index(),
                    node.pos,
                    pos
                ));
            }
            if pos > 0 && self.less(pos, (pos - 1) / 2) {
                return Err(format!("heap order violated at position {pos}"));
            }
        }
        Ok(())
    }
}

impl<T: HeapPriority> Default for IndexedMinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item {
        name: &'static str,
        score: u32,
        seq: u32,
    }

    impl HeapPriority for Item {
        type Priority = (u32, u32);

        fn priority(&self) -> (u32, u32) {
            (self.score, self.seq)
        }
    }

    fn item(name: &'static str, score: u32, seq: u32) -> Item {
        Item { name, score, seq }
    }

    #[test]
    fn pop_returns_ascending_priorities() {
        let mut heap = IndexedMinHeap::new();
        heap.push(item("c", 8, 0));
        heap.push(item("a", 1, 1));
        heap.push(item("d", 9, 2));
        heap.push(item("b", 5, 3));
        heap.validate().unwrap();

        let order: Vec<_> = std::iter::from_fn(|| heap.pop().map(|i| i.name)).collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
        assert!(heap.is_empty());
    }

    #[test]
    fn equal_scores_break_ties_by_sequence() {
        let mut heap = IndexedMinHeap::new();
        heap.push(item("late", 2, 10));
        heap.push(item("early", 2, 3));
        assert_eq!(heap.pop().map(|i| i.name), Some("early"));
    }

    #[test]
    fn remove_from_middle_keeps_positions_consistent() {
        let mut heap = IndexedMinHeap::new();
        let ids: Vec<_> = (0..16u32)
            .map(|i| heap.push(item("x", (i * 7) % 11, i)))
            .collect();

        assert!(heap.remove(ids[5]).is_some());
        assert!(heap.remove(ids[0]).is_some());
        assert!(heap.remove(ids[15]).is_some());
        assert!(heap.remove(ids[5]).is_none());
        assert_eq!(heap.len(), 13);
        heap.validate().unwrap();

        for &id in &ids {
            if let Some(pos) = heap.position(id) {
                assert_eq!(heap.heap[pos], id);
            }
        }
    }

    #[test]
    fn update_resifts_both_directions() {
        let mut heap = IndexedMinHeap::new();
        let a = heap.push(item("a", 1, 0));
        let b = heap.push(item("b", 2, 1));
        let c = heap.push(item("c", 3, 2));

        heap.update(a, |i| i.score = 10);
        heap.validate().unwrap();
        assert_eq!(heap.peek_id(), Some(b));

        heap.update(c, |i| i.score = 0);
        heap.validate().unwrap();
        assert_eq!(heap.peek_id(), Some(c));

        assert_eq!(heap.update(SlotId(99), |i| i.score), None);
    }

    #[test]
    fn min_excluding_finds_runner_up() {
        let mut heap = IndexedMinHeap::new();
        let a = heap.push(item("a", 0, 0));
        assert_eq!(heap.min_excluding(a), None);

        let b = heap.push(item("b", 4, 1));
        assert_eq!(heap.min_excluding(a), Some(b));
        assert_eq!(heap.min_excluding(b), Some(a));

        let c = heap.push(item("c", 2, 2));
        assert_eq!(heap.min_excluding(a), Some(c));
    }
}
