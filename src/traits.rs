//! # Cache Contracts
//!
//! Two traits cover everything a caller depends on:
//!
//! ```text
//!   ┌──────────────────────────────────────┐    ┌──────────────────────────────────────┐
//!   │            Cache<V>                  │    │        ConcurrentCache<V>            │
//!   │  (single-threaded, &mut self)        │    │  (Send + Sync, &self)                │
//!   │                                      │    │                                      │
//!   │  insert(String, V) → Option<V>       │    │  insert(String, V) → Option<V>       │
//!   │  get(&str) → Option<&V>              │    │  get(&str) → Option<V>               │
//!   │  peek(&str) → Option<&V>             │    │  remove(&str) → bool                 │
//!   │  remove(&str) → bool                 │    │  evict_oldest() → bool               │
//!   │  evict_oldest() → bool               │    │  len() → usize                       │
//!   │  len() → usize                       │    │                                      │
//!   └──────────────────┬───────────────────┘    └───────────────┬──────────────────────┘
//!                      │                                        │
//!       ┌──────────────┼──────────────┐               ┌─────────┴──────────┐
//!       ▼              ▼              ▼               ▼                    ▼
//!   FifoCache      LruCache       LfuCache     ShardedLruCache     GuardedCache<C>
//!                                                                 (wraps one Cache)
//! ```
//!
//! `Cache` implementations carry no locks. Mutating methods take `&mut self`,
//! so sharing one across threads requires an outer lock; [`GuardedCache`]
//! is that lock.
//!
//! ## Eviction listeners
//!
//! An [`EvictionListener`] is called with the owned key and value of every
//! entry a store drops through `remove`, `evict_oldest`, or budget eviction.
//! It is not called when `insert` replaces a value in place, nor by `clear`.
//!
//! The listener runs synchronously inside whatever critical section triggered
//! the removal: nothing for a bare store, the shard lock for
//! [`ShardedLruCache`], the guard lock for [`GuardedCache`]. Calling back into
//! the same store, shard, or guard from a listener deadlocks. Keep listeners
//! short.
//!
//! [`GuardedCache`]: crate::guard::GuardedCache
//! [`ShardedLruCache`]: crate::policy::sharded::ShardedLruCache

use std::sync::Arc;

/// Callback invoked with each entry a store removes.
pub type EvictionListener<V> = Arc<dyn Fn(String, V) + Send + Sync>;

/// Byte budget applied when a builder is not given one: 512 MiB.
pub const DEFAULT_MAX_BYTES: usize = 512 * 1024 * 1024;

/// Single-threaded cache contract shared by every eviction policy.
pub trait Cache<V> {
    /// Inserts or updates `key`. Returns the previous value on update.
    ///
    /// May evict other entries (or, if it alone exceeds the budget, the new
    /// entry itself) before returning.
    fn insert(&mut self, key: String, value: V) -> Option<V>;

    /// Looks up `key`, applying the policy's access bookkeeping on a hit.
    fn get(&mut self, key: &str) -> Option<&V>;

    /// Looks up `key` without touching recency or frequency.
    fn peek(&self, key: &str) -> Option<&V>;

    fn contains(&self, key: &str) -> bool {
        self.peek(key).is_some()
    }

    /// Removes `key`, notifying the listener. Returns `false` if absent.
    fn remove(&mut self, key: &str) -> bool;

    /// Removes the policy's next victim, notifying the listener.
    /// Returns `false` if the store is empty.
    fn evict_oldest(&mut self) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry without notifying the listener.
    fn clear(&mut self);

    /// Whether [`get`](Self::get) changes eviction order.
    ///
    /// When `false`, `get` and `peek` are interchangeable and a guard may
    /// serve lookups under a shared lock.
    fn lookup_reorders(&self) -> bool {
        true
    }
}

/// Thread-safe cache contract. Values are handed out by clone; store
/// `Arc<T>` to make that cheap.
pub trait ConcurrentCache<V>: Send + Sync {
    fn insert(&self, key: String, value: V) -> Option<V>;

    fn get(&self, key: &str) -> Option<V>;

    fn remove(&self, key: &str) -> bool;

    fn evict_oldest(&self) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct VecCache {
        data: Vec<(String, u32)>,
    }

    impl Cache<u32> for VecCache {
        fn insert(&mut self, key: String, value: u32) -> Option<u32> {
            if let Some((_, existing)) = self.data.iter_mut().find(|(k, _)| *k == key) {
                return Some(std::mem::replace(existing, value));
            }
            self.data.push((key, value));
            None
        }

        fn get(&mut self, key: &str) -> Option<&u32> {
            self.peek(key)
        }

        fn peek(&self, key: &str) -> Option<&u32> {
            self.data.iter().find(|(k, _)| k == key).map(|(_, v)| v)
        }

        fn remove(&mut self, key: &str) -> bool {
            let before = self.data.len();
            self.data.retain(|(k, _)| k != key);
            before != self.data.len()
        }

        fn evict_oldest(&mut self) -> bool {
            if self.data.is_empty() {
                return false;
            }
            self.data.remove(0);
            true
        }

        fn len(&self) -> usize {
            self.data.len()
        }

        fn clear(&mut self) {
            self.data.clear();
        }
    }

    #[test]
    fn default_methods_follow_required_ones() {
        let mut cache = VecCache { data: Vec::new() };
        assert!(cache.is_empty());
        assert_eq!(cache.insert("a".into(), 1), None);
        assert_eq!(cache.insert("a".into(), 2), Some(1));
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.lookup_reorders());
        assert!(cache.evict_oldest());
        assert!(!cache.evict_oldest());
        assert!(cache.is_empty());
    }

    #[test]
    fn default_budget_is_512_mib() {
        assert_eq!(DEFAULT_MAX_BYTES, 536_870_912);
    }

    #[test]
    fn cache_trait_is_object_safe() {
        let mut boxed: Box<dyn Cache<u32>> = Box::new(VecCache { data: Vec::new() });
        boxed.insert("k".into(), 9);
        assert_eq!(boxed.get("k"), Some(&9));
    }
}
