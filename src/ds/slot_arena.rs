//! Index-addressed node storage with slot reuse.
//!
//! Every ordering structure in this crate (the FIFO/LRU list, the LFU heap)
//! keeps its nodes in a [`SlotArena`] and links them by [`SlotId`] instead of
//! by pointer. Freed slots go on a free list and are handed out again by the
//! next insert, so a cache at steady state stops allocating.
//!
//! ```text
//!   slots:     [ Some(A) | None | Some(C) | Some(D) ]
//!   free_list: [ 1 ]
//!
//!   insert(E) -> SlotId(1)   (reuses the hole)
//!   insert(F) -> SlotId(4)   (grows the vector)
//! ```
//!
//! A `SlotId` is only meaningful for the arena that issued it, and only until
//! that slot is removed.

use std::ops::{Index, IndexMut};

/// Stable handle to a value stored in a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Node storage for the list and the heap: a vector of optional slots plus
/// the indices vacated since, reused last-in first-out.
#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
    vacant: Vec<usize>,
    occupied: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            occupied: 0,
        }
    }

    /// Stores `value`, reusing the most recently vacated slot if any.
    pub fn insert(&mut self, value: T) -> SlotId {
        self.occupied += 1;
        match self.vacant.pop() {
            Some(idx) => {
                self.slots[idx] = Some(value);
                SlotId(idx)
            },
            None => {
                self.slots.push(Some(value));
                SlotId(self.slots.len() - 1)
            },
        }
    }

    /// Vacates `id`. `None` if it was already vacant.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let value = self.slots.get_mut(id.0)?.take()?;
        self.vacant.push(id.0);
        self.occupied -= 1;
        Some(value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.0)?.as_ref()
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.slots.get(id.0).is_some_and(Option::is_some)
    }

    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Drops every value and forgets all handles issued so far.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.vacant.clear();
        self.occupied = 0;
    }
}

impl<T> Index<SlotId> for SlotArena<T> {
    type Output = T;

    /// Panics if `id` is vacant, like out-of-bounds `Vec` indexing.
    fn index(&self, id: SlotId) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("slot {} is vacant", id.0),
        }
    }
}

impl<T> IndexMut<SlotId> for SlotArena<T> {
    fn index_mut(&mut self, id: SlotId) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("slot {} is vacant", id.0),
        }
    }
}
