//! Insertion-ordered, byte-budgeted entry store.
//!
//! Backs both [`FifoCache`](crate::policy::fifo::FifoCache) and
//! [`LruCache`](crate::policy::lru::LruCache). The two policies differ only
//! in whether a lookup moves the entry to the back, so that choice is made
//! by the caller per lookup rather than baked in here.
//!
//! ```text
//!   index: FxHashMap<String, SlotId>        order: IntrusiveList<Entry<V>>
//!   ┌───────┬────────┐
//!   │  "a"  │  id_0  │──────────┐          front (victim)              back (newest)
//!   │  "b"  │  id_1  │────────┐ └────────► [a, 5B] ◄──► [b, 3B] ◄──► [c, 2B]
//!   │  "c"  │  id_2  │──────┐ └──────────────────────────┘              ▲
//!   └───────┴────────┘      └─────────────────────────────────────────────┘
//!
//!   budget: used_bytes = 10, max_bytes = 12
//! ```
//!
//! Writes always land at the back, and the budget loop always evicts from the
//! front, so an entry that fits is never evicted by its own write. An entry
//! larger than the whole budget is evicted on its own, leaving the rest of
//! the store untouched.

use std::mem;

use rustc_hash::FxHashMap;
use tracing::{trace, warn};

use crate::ds::{IntrusiveList, SlotId};
use crate::error::InvariantError;
use crate::store::budget::ByteBudget;
use crate::traits::EvictionListener;

#[derive(Debug)]
struct Entry<V> {
    key: String,
    value: V,
    size: usize,
}

pub struct LinkedStore<V, F> {
    index: FxHashMap<String, SlotId>,
    order: IntrusiveList<Entry<V>>,
    budget: ByteBudget<F>,
    listener: Option<EvictionListener<V>>,
}

impl<V, F> LinkedStore<V, F>
where
    F: Fn(&V) -> usize,
{
    pub fn new(max_bytes: usize, size_of: F) -> Self {
        Self {
            index: FxHashMap::default(),
            order: IntrusiveList::new(),
            budget: ByteBudget::new(max_bytes, size_of),
            listener: None,
        }
    }

    pub fn set_listener(&mut self, listener: EvictionListener<V>) {
        self.listener = Some(listener);
    }

    /// Inserts at the back, or updates in place and moves to the back.
    pub fn insert(&mut self, key: String, value: V) -> Option<V> {
        let size = self.budget.measure(&value);

        if let Some(&id) = self.index.get(&key) {
            self.order.move_to_back(id);
            let (previous, old_size) = match self.order.get_mut(id) {
                Some(entry) => (
                    mem::replace(&mut entry.value, value),
                    mem::replace(&mut entry.size, size),
                ),
                None => return None,
            };
            self.budget.resize(old_size, size);
            self.settle(id, size);
            return Some(previous);
        }

        let id = self.order.push_back(Entry {
            key: key.clone(),
            value,
            size,
        });
        self.index.insert(key, id);
        self.budget.charge(size);
        self.settle(id, size);
        None
    }

    /// Looks up `key`, optionally moving it to the back.
    pub fn lookup(&mut self, key: &str, promote: bool) -> Option<&V> {
        let id = *self.index.get(key)?;
        if promote {
            self.order.move_to_back(id);
        }
        self.order.get(id).map(|entry| &entry.value)
    }

    pub fn peek(&self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.order.get(id).map(|entry| &entry.value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let Some(id) = self.index.remove(key) else {
            return false;
        };
        match self.order.remove(id) {
            Some(entry) => {
                self.budget.release(entry.size);
                self.notify(entry);
                true
            },
            None => false,
        }
    }

    /// Evicts the front entry.
    pub fn evict_front(&mut self) -> bool {
        match self.order.front_id() {
            Some(id) => self.evict_id(id),
            None => false,
        }
    }

    fn evict_id(&mut self, id: SlotId) -> bool {
        let Some(entry) = self.order.remove(id) else {
            return false;
        };
        self.index.remove(&entry.key);
        self.budget.release(entry.size);
        trace!(
            key = %entry.key,
            size = entry.size,
            used_bytes = self.budget.used_bytes(),
            "evicted entry"
        );
        self.notify(entry);
        true
    }

    /// Key at the front, i.e. the next victim.
    pub fn front_key(&self) -> Option<&str> {
        self.order.front().map(|entry| entry.key.as_str())
    }

    /// Keys from front (next victim) to back.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|entry| entry.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
        self.budget.reset();
    }

    pub fn used_bytes(&self) -> usize {
        self.budget.used_bytes()
    }

    pub fn max_bytes(&self) -> usize {
        self.budget.max_bytes()
    }

    /// Restores the budget after writing `size` bytes at `written`.
    ///
    /// An entry that can never fit is the only victim. Otherwise entries are
    /// evicted from the front, which reaches `written` last.
    fn settle(&mut self, written: SlotId, size: usize) {
        if self.budget.exceeds_whole_budget(size) {
            warn!(
                key = self.order.get(written).map_or("", |entry| entry.key.as_str()),
                size,
                max_bytes = self.budget.max_bytes(),
                "entry larger than the whole byte budget; evicting it alone"
            );
            self.evict_id(written);
            return;
        }
        while self.budget.is_over() {
            if !self.evict_front() {
                break;
            }
        }
    }

    fn notify(&self, entry: Entry<V>) {
        if let Some(listener) = &self.listener {
            listener(entry.key, entry.value);
        }
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.order.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but order holds {} entries",
                self.index.len(),
                self.order.len()
            )));
        }
        self.order.validate_links().map_err(InvariantError::new)?;

        let mut total = 0usize;
        for entry in self.order.iter() {
            match self.index.get(&entry.key) {
                Some(&id) if self.order.get(id).is_some_and(|e| e.key == entry.key) => {},
                _ => {
                    return Err(InvariantError::new(format!(
                        "key {:?} is not indexed at its own node",
                        entry.key
                    )));
                },
            }
            total += entry.size;
        }
        if total != self.budget.used_bytes() {
            return Err(InvariantError::new(format!(
                "used_bytes is {} but entries sum to {}",
                self.budget.used_bytes(),
                total
            )));
        }
        if self.budget.is_over() && self.order.len() > 1 {
            return Err(InvariantError::new(format!(
                "{} bytes used over a budget of {}",
                self.budget.used_bytes(),
                self.budget.max_bytes()
            )));
        }
        Ok(())
    }
}
