//! # Least Frequently Used (LFU) Cache
//!
//! Byte-budgeted LFU backed by an [`IndexedMinHeap`]. Each entry carries a
//! weight (its access count) and the sequence number of its last touch; the
//! heap orders entries by `(weight, seq)`, so the victim is the least
//! frequently used entry and, among equals, the one touched longest ago.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────────┐
//!   │                          LfuCache<V, F>                               │
//!   │                                                                       │
//!   │   index: FxHashMap<String, SlotId>                                    │
//!   │   ┌─────────┬────────┐                                                │
//!   │   │  "a"    │  id_0  │──┐                                             │
//!   │   │  "b"    │  id_1  │──┼──┐                                          │
//!   │   │  "c"    │  id_2  │──┼──┼──┐                                       │
//!   │   └─────────┴────────┘  │  │  │                                       │
//!   │                         ▼  ▼  ▼                                       │
//!   │   heap: IndexedMinHeap<LfuEntry<V>>                                   │
//!   │                                                                       │
//!   │                 c (w=0, seq=5)          ← evict_oldest pops this      │
//!   │                /              \                                       │
//!   │        b (w=1, seq=4)    a (w=2, seq=3)                               │
//!   │                                                                       │
//!   │   budget: ByteBudget { used_bytes, max_bytes, size_of }               │
//!   │   tick: u64  (stamps every insert, update, and hit)                   │
//!   └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Weight Rules
//!
//! | Event             | Weight        | Sequence     |
//! |-------------------|---------------|--------------|
//! | insert (new key)  | 0             | next tick    |
//! | insert (update)   | +1            | next tick    |
//! | `get` hit         | +1            | next tick    |
//! | `peek`            | unchanged     | unchanged    |
//!
//! ## Budget Enforcement
//!
//! After a write, victims are taken from the heap minimum until the budget
//! holds. A brand-new entry is skipped: it starts at weight 0, so it would
//! otherwise evict itself from any full cache. An updated entry gets no such
//! pass and leaves first if its weight is still the lowest. An entry larger
//! than the whole budget is evicted on its own and nothing else is touched.
//!
//! ## Example
//!
//! ```
//! use hotcache::policy::lfu::LfuCache;
//! use hotcache::traits::Cache;
//!
//! let mut cache = LfuCache::new(10, |v: &u64| *v as usize);
//! cache.insert("a".into(), 5);
//! cache.insert("b".into(), 5);
//! cache.get("a");
//! cache.get("a");
//! cache.get("b");
//!
//! cache.insert("c".into(), 5);
//! assert!(cache.contains("a"));
//! assert!(!cache.contains("b"));
//! assert_eq!(cache.frequency("a"), Some(2));
//! ```

use std::fmt;
use std::mem;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{trace, warn};

use crate::ds::{HeapPriority, IndexedMinHeap, SlotId};
use crate::error::InvariantError;
use crate::store::budget::ByteBudget;
use crate::traits::{Cache, EvictionListener};

#[derive(Debug)]
struct LfuEntry<V> {
    key: String,
    value: V,
    size: usize,
    weight: u64,
    seq: u64,
}

impl<V> HeapPriority for LfuEntry<V> {
    type Priority = (u64, u64);

    #[inline]
    fn priority(&self) -> Self::Priority {
        (self.weight, self.seq)
    }
}

/// Byte-budgeted least-frequently-used cache.
pub struct LfuCache<V, F> {
    index: FxHashMap<String, SlotId>,
    heap: IndexedMinHeap<LfuEntry<V>>,
    budget: ByteBudget<F>,
    tick: u64,
    listener: Option<EvictionListener<V>>,
}

impl<V, F> LfuCache<V, F>
where
    F: Fn(&V) -> usize,
{
    /// Creates a cache holding at most `max_bytes` of values as measured by
    /// `size_of`. `max_bytes == 0` disables the budget.
    pub fn new(max_bytes: usize, size_of: F) -> Self {
        Self {
            index: FxHashMap::default(),
            heap: IndexedMinHeap::new(),
            budget: ByteBudget::new(max_bytes, size_of),
            tick: 0,
            listener: None,
        }
    }

    /// Registers a callback for every removed entry.
    pub fn with_listener(self, listener: impl Fn(String, V) + Send + Sync + 'static) -> Self
    where
        V: 'static,
    {
        self.with_shared_listener(Arc::new(listener))
    }

    pub fn with_shared_listener(mut self, listener: EvictionListener<V>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn used_bytes(&self) -> usize {
        self.budget.used_bytes()
    }

    pub fn max_bytes(&self) -> usize {
        self.budget.max_bytes()
    }

    /// Current weight of `key`.
    pub fn frequency(&self, key: &str) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.heap.get(id).map(|entry| entry.weight)
    }

    /// Key that `evict_oldest` would remove next.
    pub fn peek_lfu(&self) -> Option<&str> {
        self.heap.peek().map(|entry| entry.key.as_str())
    }

    fn next_seq(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn evict_id(&mut self, id: SlotId) -> bool {
        let Some(entry) = self.heap.remove(id) else {
            return false;
        };
        self.index.remove(&entry.key);
        self.budget.release(entry.size);
        trace!(
            key = %entry.key,
            size = entry.size,
            weight = entry.weight,
            used_bytes = self.budget.used_bytes(),
            "evicted least frequently used entry"
        );
        self.notify(entry);
        true
    }

    /// Restores the budget after writing `size` bytes at `written`.
    ///
    /// An entry that can never fit is the only victim. Otherwise the heap
    /// minimum goes first, except that a `fresh` insert is passed over: at
    /// weight 0 it would always be its own victim.
    fn settle(&mut self, written: SlotId, size: usize, fresh: bool) {
        if self.budget.exceeds_whole_budget(size) {
            warn!(
                key = self.heap.get(written).map_or("", |entry| entry.key.as_str()),
                size,
                max_bytes = self.budget.max_bytes(),
                "entry larger than the whole byte budget; evicting it alone"
            );
            self.evict_id(written);
            return;
        }
        while self.budget.is_over() {
            let victim = if fresh {
                self.heap.min_excluding(written)
            } else {
                self.heap.peek_id()
            };
            match victim {
                Some(id) if self.evict_id(id) => {},
                _ => break,
            }
        }
    }

    fn notify(&self, entry: LfuEntry<V>) {
        if let Some(listener) = &self.listener {
            listener(entry.key, entry.value);
        }
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.heap.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but heap holds {} entries",
                self.index.len(),
                self.heap.len()
            )));
        }
        self.heap.validate().map_err(InvariantError::new)?;

        let mut total = 0usize;
        for (id, entry) in self.heap.iter() {
            if self.index.get(&entry.key) != Some(&id) {
                return Err(InvariantError::new(format!(
                    "key {:?} is not indexed at its own heap node",
                    entry.key
                )));
            }
            if entry.seq > self.tick {
                return Err(InvariantError::new(format!(
                    "key {:?} stamped {} past the current tick {}",
                    entry.key, entry.seq, self.tick
                )));
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
        if self.budget.is_over() && self.heap.len() > 1 {
            return Err(InvariantError::new(format!(
                "{} bytes used over a budget of {}",
                self.budget.used_bytes(),
                self.budget.max_bytes()
            )));
        }
        Ok(())
    }
}

impl<V, F> Cache<V> for LfuCache<V, F>
where
    F: Fn(&V) -> usize,
{
    fn insert(&mut self, key: String, value: V) -> Option<V> {
        let size = self.budget.measure(&value);
        let seq = self.next_seq();

        if let Some(&id) = self.index.get(&key) {
            let swapped = self.heap.update(id, |entry| {
                entry.weight = entry.weight.saturating_add(1);
                entry.seq = seq;
                (
                    mem::replace(&mut entry.value, value),
                    mem::replace(&mut entry.size, size),
                )
            });
            let (previous, old_size) = swapped?;
            self.budget.resize(old_size, size);
            self.settle(id, size, false);
            return Some(previous);
        }

        let id = self.heap.push(LfuEntry {
            key: key.clone(),
            value,
            size,
            weight: 0,
            seq,
        });
        self.index.insert(key, id);
        self.budget.charge(size);
        self.settle(id, size, true);
        None
    }

    fn get(&mut self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        let seq = self.next_seq();
        self.heap.update(id, |entry| {
            entry.weight = entry.weight.saturating_add(1);
            entry.seq = seq;
        })?;
        self.heap.get(id).map(|entry| &entry.value)
    }

    fn peek(&self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.heap.get(id).map(|entry| &entry.value)
    }

    fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn remove(&mut self, key: &str) -> bool {
        let Some(id) = self.index.remove(key) else {
            return false;
        };
        match self.heap.remove(id) {
            Some(entry) => {
                self.budget.release(entry.size);
                self.notify(entry);
                true
            },
            None => false,
        }
    }

    fn evict_oldest(&mut self) -> bool {
        match self.heap.peek_id() {
            Some(id) => self.evict_id(id),
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn clear(&mut self) {
        self.index.clear();
        self.heap.clear();
        self.budget.reset();
    }
}

impl<V, F> fmt::Debug for LfuCache<V, F>
where
    F: Fn(&V) -> usize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCache")
            .field("len", &self.heap.len())
            .field("used_bytes", &self.budget.used_bytes())
            .field("max_bytes", &self.budget.max_bytes())
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}
