//! # Guarded Cache
//!
//! Puts one single-threaded [`Cache`] behind one [`parking_lot::RwLock`] and
//! counts lookups and hits.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                      GuardedCache<C, V>                          │
//!   │                                                                  │
//!   │   ┌──────────────────────────────────────────────────────────┐   │
//!   │   │  RwLock<C>   (C = FifoCache | LruCache | LfuCache | ...) │   │
//!   │   └──────────────────────────────────────────────────────────┘   │
//!   │                                                                  │
//!   │   lookups: AtomicU64    hits: AtomicU64                          │
//!   │   observer: Option<Arc<dyn LookupObserver>>                      │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lock Selection
//!
//! | Operation                        | Lock                                   |
//! |----------------------------------|----------------------------------------|
//! | `insert`, `remove`, `clear`      | write                                  |
//! | `evict_oldest`                   | write                                  |
//! | `get` (LRU, LFU)                 | write: the lookup reorders the store   |
//! | `get` (FIFO)                     | read: lookups never reorder            |
//! | `peek`, `contains`, `len`        | read                                   |
//!
//! The choice for `get` comes from [`Cache::lookup_reorders`], read once at
//! construction.
//!
//! ## Statistics
//!
//! `get` and `peek` bump `lookups`, and `hits` when a value was found. Both
//! counters move while the lock is still held, lookups first, so a
//! [`CacheStats`] snapshot never reports more hits than lookups. The observer,
//! if any, is notified after the lock is released.
//!
//! ## Example
//!
//! ```
//! use hotcache::guard::GuardedCache;
//! use hotcache::policy::lru::LruCache;
//! use hotcache::traits::ConcurrentCache;
//!
//! let cache = GuardedCache::new(LruCache::new(1024, |v: &String| v.len()));
//! cache.insert("k".to_string(), "v".to_string());
//!
//! assert_eq!(cache.get("k").as_deref(), Some("v"));
//! assert_eq!(cache.get("missing"), None);
//!
//! let stats = cache.stats();
//! assert_eq!((stats.hits, stats.lookups), (1, 2));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use crate::metrics::snapshot::CacheStats;
use crate::metrics::traits::LookupObserver;
use crate::traits::{Cache, ConcurrentCache};

/// One [`Cache`] shared across threads behind a reader-writer lock.
pub struct GuardedCache<C, V> {
    inner: RwLock<C>,
    reorders: bool,
    lookups: AtomicU64,
    hits: AtomicU64,
    observer: Option<Arc<dyn LookupObserver>>,
    _values: PhantomData<fn() -> V>,
}

impl<C, V> GuardedCache<C, V>
where
    C: Cache<V>,
{
    pub fn new(store: C) -> Self {
        let reorders = store.lookup_reorders();
        debug!(len = store.len(), reorders, "created guarded cache");
        Self {
            inner: RwLock::new(store),
            reorders,
            lookups: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            observer: None,
            _values: PhantomData,
        }
    }

    /// Attaches a sink notified of every counted lookup.
    pub fn with_observer(mut self, observer: Arc<dyn LookupObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Hit and lookup counts since construction or the last
    /// [`reset_stats`](Self::reset_stats).
    pub fn stats(&self) -> CacheStats {
        // Hits are read first; see the module docs on ordering.
        let hits = self.hits.load(Ordering::Acquire);
        let lookups = self.lookups.load(Ordering::Acquire);
        CacheStats { hits, lookups }
    }

    pub fn reset_stats(&self) {
        let _guard = self.inner.write();
        self.lookups.store(0, Ordering::Release);
        self.hits.store(0, Ordering::Release);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().contains(key)
    }

    /// Drops every entry without notifying the store's listener.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Runs `f` with shared access to the store.
    pub fn with_read<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&*self.inner.read())
    }

    /// Runs `f` with exclusive access to the store. Uncounted.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut *self.inner.write())
    }

    pub fn into_inner(self) -> C {
        self.inner.into_inner()
    }

    #[inline]
    fn record(&self, hit: bool) {
        self.lookups.fetch_add(1, Ordering::Release);
        if hit {
            self.hits.fetch_add(1, Ordering::Release);
        }
    }

    fn observe(&self, key: &str, hit: bool) {
        if let Some(observer) = &self.observer {
            if hit {
                observer.on_hit(key);
            } else {
                observer.on_miss(key);
            }
        }
    }
}

impl<C, V> GuardedCache<C, V>
where
    C: Cache<V>,
    V: Clone,
{
    /// Looks up `key` without policy side effects. Counted like `get`.
    pub fn peek(&self, key: &str) -> Option<V> {
        let found = {
            let store = self.inner.read();
            let found = store.peek(key).cloned();
            self.record(found.is_some());
            found
        };
        self.observe(key, found.is_some());
        found
    }

    fn lookup(&self, key: &str) -> Option<V> {
        let found = if self.reorders {
            let mut store = self.inner.write();
            let found = store.get(key).cloned();
            self.record(found.is_some());
            found
        } else {
            let store = self.inner.read();
            let found = store.peek(key).cloned();
            self.record(found.is_some());
            found
        };
        self.observe(key, found.is_some());
        found
    }
}

impl<C, V> ConcurrentCache<V> for GuardedCache<C, V>
where
    C: Cache<V> + Send + Sync,
    V: Clone + Send + Sync,
{
    fn insert(&self, key: String, value: V) -> Option<V> {
        self.inner.write().insert(key, value)
    }

    fn get(&self, key: &str) -> Option<V> {
        self.lookup(key)
    }

    fn remove(&self, key: &str) -> bool {
        self.inner.write().remove(key)
    }

    fn evict_oldest(&self) -> bool {
        self.inner.write().evict_oldest()
    }

    fn len(&self) -> usize {
        self.inner.read().len()
    }
}

impl<C, V> fmt::Debug for GuardedCache<C, V>
where
    C: Cache<V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("GuardedCache")
            .field("len", &self.inner.read().len())
            .field("reorders", &self.reorders)
            .field("hits", &stats.hits)
            .field("lookups", &stats.lookups)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::policy::fifo::FifoCache;
    use crate::policy::lfu::LfuCache;
    use crate::policy::lru::LruCache;

    fn unit(_: &u32) -> usize {
        1
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<(String, bool)>>,
    }

    impl LookupObserver for Recorder {
        fn on_hit(&self, key: &str) {
            self.events.lock().unwrap().push((key.to_string(), true));
        }

        fn on_miss(&self, key: &str) {
            self.events.lock().unwrap().push((key.to_string(), false));
        }
    }

    #[test]
    fn get_counts_hits_and_lookups() {
        let cache = GuardedCache::new(FifoCache::new(0, unit as fn(&u32) -> usize));
        cache.insert("a".into(), 1);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.peek("a"), Some(1));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 2,
                lookups: 3
            }
        );

        cache.reset_stats();
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn lru_get_goes_through_write_lock_and_reorders() {
        let cache = GuardedCache::new(LruCache::new(2, unit as fn(&u32) -> usize));
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        cache.get("a");
        cache.insert("c".into(), 3);

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        cache.with_read(|store| store.check_invariants()).unwrap();
    }

    #[test]
    fn lfu_get_updates_weights() {
        let cache = GuardedCache::new(LfuCache::new(0, unit as fn(&u32) -> usize));
        cache.insert("a".into(), 1);
        cache.get("a");
        cache.get("a");
        assert_eq!(cache.with_read(|store| store.frequency("a")), Some(2));
    }

    #[test]
    fn fifo_guard_uses_shared_lookups() {
        let cache = GuardedCache::new(FifoCache::new(0, unit as fn(&u32) -> usize));
        assert!(!cache.reorders);
        let cache = GuardedCache::new(LruCache::new(0, unit as fn(&u32) -> usize));
        assert!(cache.reorders);
    }

    #[test]
    fn observer_sees_every_counted_lookup() {
        let recorder = Arc::new(Recorder::default());
        let cache = GuardedCache::new(LruCache::new(0, unit as fn(&u32) -> usize))
            .with_observer(recorder.clone());
        cache.insert("a".into(), 1);
        cache.get("a");
        cache.get("x");
        cache.peek("a");

        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![
                ("a".to_string(), true),
                ("x".to_string(), false),
                ("a".to_string(), true),
            ]
        );
    }

    #[test]
    fn mutations_pass_through() {
        let cache = GuardedCache::new(LruCache::new(0, unit as fn(&u32) -> usize));
        assert_eq!(cache.insert("a".into(), 1), None);
        assert_eq!(cache.insert("a".into(), 2), Some(1));
        cache.insert("b".into(), 3);
        assert_eq!(cache.len(), 2);
        assert!(cache.evict_oldest());
        assert!(!cache.contains("a"));
        assert!(cache.remove("b"));
        assert!(cache.is_empty());

        cache.insert("c".into(), 4);
        cache.with_write(|store| store.clear());
        assert!(cache.is_empty());

        let store = cache.into_inner();
        assert_eq!(store.used_bytes(), 0);
    }
}
