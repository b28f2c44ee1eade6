//! # Sharded LRU Cache
//!
//! Partitions the key space across independent, entry-count-bounded LRU
//! shards, each behind its own [`parking_lot::RwLock`], so operations on
//! different shards never contend.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────────────────┐
//!   │                     ShardedLruCache<V, H = Fnv1a>                      │
//!   │                                                                        │
//!   │   selector: ShardSelector { mask = shards - 1, hasher: H }             │
//!   │   clock:    AtomicU64  (stamps entries on insert and hit)              │
//!   │                                                                        │
//!   │       "user:1"        "user:2"        "user:3"        "user:4"         │
//!   │          │               │               │               │             │
//!   │          ▼               ▼               ▼               ▼             │
//!   │   ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌────────────┐       │
//!   │   │ RwLock     │  │ RwLock     │  │ RwLock     │  │ RwLock     │       │
//!   │   │ LruShard 0 │  │ LruShard 1 │  │ LruShard 2 │  │ LruShard 3 │       │
//!   │   │ [e7][e9]   │  │ [e2]       │  │ [e4][e5]   │  │            │       │
//!   │   └────────────┘  └────────────┘  └────────────┘  └────────────┘       │
//!   │      ▲ front of each shard = that shard's least recently used          │
//!   └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking
//!
//! | Operation              | Lock                                    |
//! |------------------------|-----------------------------------------|
//! | `insert`, `get`        | write lock on the key's shard           |
//! | `remove`               | write lock on the key's shard           |
//! | `peek`, `contains`     | read lock on the key's shard            |
//! | `len`, `shard_lens`    | read lock on each shard, one at a time  |
//! | `evict_oldest`         | read each shard, then write one shard   |
//! | `clear`                | write lock on each shard, one at a time |
//!
//! No operation holds two shard locks at once. `len` is the sum of
//! point-in-time shard counts and is not atomic across shards.
//!
//! ## Global Eviction
//!
//! Each shard is its own LRU, so "the oldest entry in the whole cache" is
//! approximated with a store-wide tick: every insert and hit stamps its entry,
//! and `evict_oldest` evicts the front of the shard whose front carries the
//! smallest stamp. Under concurrent writers the choice is best-effort.
//!
//! ## Example
//!
//! ```
//! use hotcache::policy::sharded::ShardedLruCache;
//! use hotcache::traits::ConcurrentCache;
//!
//! let cache = ShardedLruCache::new(1024, 8).unwrap();
//! cache.insert("user:1".to_string(), 42u64);
//! assert_eq!(cache.get("user:1"), Some(42));
//! assert_eq!(cache.len(), 1);
//!
//! assert!(ShardedLruCache::<u64>::new(1024, 12).is_err());
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::ds::{IntrusiveList, ShardSelector, SlotId};
use crate::error::{ConfigError, InvariantError};
use crate::hash::{Fnv1a, KeyHasher};
use crate::traits::{ConcurrentCache, EvictionListener};

#[derive(Debug)]
struct ShardEntry<V> {
    key: String,
    value: V,
    stamp: u64,
}

/// One entry-count-bounded LRU partition.
#[derive(Debug)]
struct LruShard<V> {
    index: FxHashMap<String, SlotId>,
    order: IntrusiveList<ShardEntry<V>>,
    max_entries: usize,
}

impl<V> LruShard<V> {
    fn new(max_entries: usize) -> Self {
        Self {
            index: FxHashMap::default(),
            order: IntrusiveList::new(),
            max_entries,
        }
    }

    fn insert(
        &mut self,
        key: String,
        value: V,
        stamp: u64,
        listener: Option<&EvictionListener<V>>,
    ) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            self.order.move_to_back(id);
            return self.order.get_mut(id).map(|entry| {
                entry.stamp = stamp;
                std::mem::replace(&mut entry.value, value)
            });
        }

        let id = self.order.push_back(ShardEntry {
            key: key.clone(),
            value,
            stamp,
        });
        self.index.insert(key, id);

        while self.max_entries > 0 && self.order.len() > self.max_entries {
            if !self.evict_front(listener) {
                break;
            }
        }
        None
    }

    fn get(&mut self, key: &str, stamp: u64) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.order.move_to_back(id);
        let entry = self.order.get_mut(id)?;
        entry.stamp = stamp;
        Some(&entry.value)
    }

    fn peek(&self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.order.get(id).map(|entry| &entry.value)
    }

    fn remove(&mut self, key: &str, listener: Option<&EvictionListener<V>>) -> bool {
        let Some(id) = self.index.remove(key) else {
            return false;
        };
        match self.order.remove(id) {
            Some(entry) => {
                notify(listener, entry);
                true
            },
            None => false,
        }
    }

    fn evict_front(&mut self, listener: Option<&EvictionListener<V>>) -> bool {
        let Some(entry) = self.order.pop_front() else {
            return false;
        };
        self.index.remove(&entry.key);
        trace!(key = %entry.key, stamp = entry.stamp, "evicted shard lru entry");
        notify(listener, entry);
        true
    }

    fn front_stamp(&self) -> Option<u64> {
        self.order.front().map(|entry| entry.stamp)
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }

    fn check_invariants(&self) -> Result<(), String> {
        if self.index.len() != self.order.len() {
            return Err(format!(
                "index holds {} keys but order holds {} entries",
                self.index.len(),
                self.order.len()
            ));
        }
        if self.max_entries > 0 && self.order.len() > self.max_entries {
            return Err(format!(
                "{} entries over a bound of {}",
                self.order.len(),
                self.max_entries
            ));
        }
        self.order.validate_links()?;
        let mut last_stamp = 0;
        for entry in self.order.iter() {
            if self.index.get(&entry.key).and_then(|&id| self.order.get(id)).map(|e| &e.key)
                != Some(&entry.key)
            {
                return Err(format!("key {:?} is not indexed at its own node", entry.key));
            }
            if entry.stamp < last_stamp {
                return Err(format!("stamps decrease at key {:?}", entry.key));
            }
            last_stamp = entry.stamp;
        }
        Ok(())
    }
}

fn notify<V>(listener: Option<&EvictionListener<V>>, entry: ShardEntry<V>) {
    if let Some(listener) = listener {
        listener(entry.key, entry.value);
    }
}

/// LRU cache split into independently locked shards.
///
/// Entry-count bounded per shard rather than byte-budgeted.
pub struct ShardedLruCache<V, H = Fnv1a> {
    shards: Vec<RwLock<LruShard<V>>>,
    selector: ShardSelector<H>,
    clock: AtomicU64,
    max_entries_per_shard: usize,
    listener: Option<EvictionListener<V>>,
}

impl<V> ShardedLruCache<V, Fnv1a> {
    /// Creates `shard_count` shards of at most `max_entries_per_shard`
    /// entries each (`0` = unbounded), routed by FNV-1a.
    ///
    /// Fails unless `shard_count` is a non-zero power of two.
    pub fn new(max_entries_per_shard: usize, shard_count: usize) -> Result<Self, ConfigError> {
        Self::with_hasher(max_entries_per_shard, shard_count, Fnv1a)
    }
}

impl<V, H: KeyHasher> ShardedLruCache<V, H> {
    /// Like [`new`](ShardedLruCache::new) with a custom routing hasher.
    pub fn with_hasher(
        max_entries_per_shard: usize,
        shard_count: usize,
        hasher: H,
    ) -> Result<Self, ConfigError> {
        let selector = ShardSelector::new(shard_count, hasher)?;
        let shards = (0..shard_count)
            .map(|_| RwLock::new(LruShard::new(max_entries_per_shard)))
            .collect();
        debug!(shard_count, max_entries_per_shard, "created sharded lru cache");
        Ok(Self {
            shards,
            selector,
            clock: AtomicU64::new(0),
            max_entries_per_shard,
            listener: None,
        })
    }

    /// Registers a callback for every removed entry.
    ///
    /// Runs under the shard's write lock.
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

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn max_entries_per_shard(&self) -> usize {
        self.max_entries_per_shard
    }

    /// Shard index `key` routes to.
    #[inline]
    pub fn shard_for_key(&self, key: &str) -> usize {
        self.selector.shard_for_key(key)
    }

    /// Per-shard entry counts, in shard order.
    pub fn shard_lens(&self) -> Vec<usize> {
        self.shards.iter().map(|shard| shard.read().len()).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.shard(key).read().index.contains_key(key)
    }

    /// Empties every shard without notifying the listener.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.write().clear();
        }
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for (i, shard) in self.shards.iter().enumerate() {
            let shard = shard.read();
            shard
                .check_invariants()
                .map_err(|msg| InvariantError::new(format!("shard {i}: {msg}")))?;
            for entry in shard.order.iter() {
                let routed = self.selector.shard_for_key(&entry.key);
                if routed != i {
                    return Err(InvariantError::new(format!(
                        "key {:?} stored in shard {i} but routes to {routed}",
                        entry.key
                    )));
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn shard(&self, key: &str) -> &RwLock<LruShard<V>> {
        &self.shards[self.selector.shard_for_key(key)]
    }

    #[inline]
    fn next_stamp(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn oldest_shard(&self) -> Option<usize> {
        self.shards
            .iter()
            .enumerate()
            .filter_map(|(i, shard)| shard.read().front_stamp().map(|stamp| (stamp, i)))
            .min()
            .map(|(_, i)| i)
    }
}

impl<V: Clone, H: KeyHasher> ShardedLruCache<V, H> {
    /// Looks up `key` without changing its recency.
    pub fn peek(&self, key: &str) -> Option<V> {
        self.shard(key).read().peek(key).cloned()
    }
}

impl<V, H> ConcurrentCache<V> for ShardedLruCache<V, H>
where
    V: Clone + Send + Sync,
    H: KeyHasher,
{
    fn insert(&self, key: String, value: V) -> Option<V> {
        let mut shard = self.shard(&key).write();
        let stamp = self.next_stamp();
        shard.insert(key, value, stamp, self.listener.as_ref())
    }

    fn get(&self, key: &str) -> Option<V> {
        let mut shard = self.shard(key).write();
        let stamp = self.next_stamp();
        shard.get(key, stamp).cloned()
    }

    fn remove(&self, key: &str) -> bool {
        self.shard(key).write().remove(key, self.listener.as_ref())
    }

    fn evict_oldest(&self) -> bool {
        // The chosen shard can be drained between the scan and the write
        // lock; rescan until an eviction lands or every shard is empty.
        while let Some(i) = self.oldest_shard() {
            if self.shards[i].write().evict_front(self.listener.as_ref()) {
                return true;
            }
        }
        false
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }
}

impl<V, H> fmt::Debug for ShardedLruCache<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedLruCache")
            .field("shard_count", &self.shards.len())
            .field("max_entries_per_shard", &self.max_entries_per_shard)
            .field("clock", &self.clock.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
