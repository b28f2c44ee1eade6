//! # Least Recently Used (LRU) Cache
//!
//! Byte-budgeted LRU over a [`LinkedStore`]: every hit moves the entry to the
//! back of the list, and the budget loop evicts from the front.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                        LruCache<V, F>                            │
//!   │                                                                  │
//!   │   FxHashMap<String, SlotId>                                      │
//!   │   ┌─────────┬────────┐                                           │
//!   │   │  "a"    │  id_0  │─────┐                                     │
//!   │   │  "b"    │  id_1  │───┐ │                                     │
//!   │   │  "c"    │  id_2  │─┐ │ │                                     │
//!   │   └─────────┴────────┘ │ │ │                                     │
//!   │                        ▼ ▼ ▼                                     │
//!   │   IntrusiveList   front ──► [a] ◄──► [b] ◄──► [c] ◄── back       │
//!   │                   (LRU, next victim)            (MRU)            │
//!   │                                                                  │
//!   │   ByteBudget { used_bytes, max_bytes, size_of: F }               │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation      | Effect on order                   | Complexity |
//! |----------------|-----------------------------------|------------|
//! | `insert` (new) | Append at back, then enforce      | O(1) amort.|
//! | `insert` (upd) | Move to back, resize, enforce     | O(1) amort.|
//! | `get`          | Move to back                      | O(1)       |
//! | `peek`         | None                              | O(1)       |
//! | `remove`       | Unlink                            | O(1)       |
//! | `evict_oldest` | Pop front                         | O(1)       |
//!
//! ## Example
//!
//! ```
//! use hotcache::policy::lru::LruCache;
//! use hotcache::traits::Cache;
//!
//! let mut cache = LruCache::new(10, |v: &Vec<u8>| v.len());
//! cache.insert("a".into(), vec![0; 5]);
//! cache.insert("b".into(), vec![0; 5]);
//!
//! // Touching "a" makes "b" the least recently used.
//! cache.get("a");
//! cache.insert("c".into(), vec![0; 5]);
//!
//! assert!(cache.contains("a"));
//! assert!(!cache.contains("b"));
//! ```
//!
//! ## Thread Safety
//!
//! `get` needs `&mut self`. For shared access use
//! [`GuardedCache`](crate::guard::GuardedCache), which takes its write lock
//! for LRU lookups, or [`ShardedLruCache`](crate::policy::sharded::ShardedLruCache)
//! to spread that contention across shards.

use std::fmt;
use std::sync::Arc;

use crate::error::InvariantError;
use crate::store::linked::LinkedStore;
use crate::traits::{Cache, EvictionListener};

/// Byte-budgeted least-recently-used cache.
pub struct LruCache<V, F> {
    store: LinkedStore<V, F>,
}

impl<V, F> LruCache<V, F>
where
    F: Fn(&V) -> usize,
{
    /// Creates a cache holding at most `max_bytes` of values as measured by
    /// `size_of`. `max_bytes == 0` disables the budget.
    pub fn new(max_bytes: usize, size_of: F) -> Self {
        Self {
            store: LinkedStore::new(max_bytes, size_of),
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
        self.store.set_listener(listener);
        self
    }

    pub fn used_bytes(&self) -> usize {
        self.store.used_bytes()
    }

    pub fn max_bytes(&self) -> usize {
        self.store.max_bytes()
    }

    /// Least recently used key, i.e. the next victim.
    pub fn peek_lru(&self) -> Option<&str> {
        self.store.front_key()
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.store.keys()
    }

    /// Marks `key` as most recently used without reading it.
    pub fn touch(&mut self, key: &str) -> bool {
        self.store.lookup(key, true).is_some()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.store.check_invariants()
    }
}

impl<V, F> Cache<V> for LruCache<V, F>
where
    F: Fn(&V) -> usize,
{
    fn insert(&mut self, key: String, value: V) -> Option<V> {
        self.store.insert(key, value)
    }

    #[inline]
    fn get(&mut self, key: &str) -> Option<&V> {
        self.store.lookup(key, true)
    }

    fn peek(&self, key: &str) -> Option<&V> {
        self.store.peek(key)
    }

    fn contains(&self, key: &str) -> bool {
        self.store.contains(key)
    }

    fn remove(&mut self, key: &str) -> bool {
        self.store.remove(key)
    }

    fn evict_oldest(&mut self) -> bool {
        self.store.evict_front()
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn clear(&mut self) {
        self.store.clear();
    }
}

impl<V, F> fmt::Debug for LruCache<V, F>
where
    F: Fn(&V) -> usize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.store.len())
            .field("used_bytes", &self.store.used_bytes())
            .field("max_bytes", &self.store.max_bytes())
            .finish_non_exhaustive()
    }
}
