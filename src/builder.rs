//! Unified cache builder for all eviction policies.
//!
//! Provides one configuration object that produces any policy behind a
//! single type, plus the sharded and guarded concurrent variants.
//!
//! ## Example
//!
//! ```rust
//! use hotcache::builder::{CacheBuilder, Policy};
//! use hotcache::traits::Cache;
//!
//! let mut cache = CacheBuilder::new()
//!     .max_bytes(64)
//!     .build(Policy::Lru, |v: &String| v.len());
//! cache.insert("greeting".to_string(), "hello".to_string());
//! assert_eq!(cache.get("greeting").map(String::as_str), Some("hello"));
//! ```

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use crate::error::ConfigError;
use crate::error::InvariantError;
#[cfg(feature = "concurrency")]
use crate::guard::GuardedCache;
use crate::metrics::observer::TracingObserver;
use crate::metrics::traits::LookupObserver;
use crate::policy::fifo::FifoCache;
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
#[cfg(feature = "concurrency")]
use crate::policy::sharded::ShardedLruCache;
use crate::traits::{Cache, DEFAULT_MAX_BYTES, EvictionListener};

/// Available byte-budgeted eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Policy {
    /// First In, First Out eviction.
    Fifo,
    /// Least Recently Used eviction.
    #[default]
    Lru,
    /// Least Frequently Used eviction (heap-based).
    Lfu,
}

/// Plain construction parameters, independent of the value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Byte budget for FIFO/LRU/LFU. `0` disables the budget.
    pub max_bytes: usize,
    /// Shard count for the sharded cache. Must be a non-zero power of two.
    pub shard_count: usize,
    /// Entry bound per shard. `0` disables the bound.
    pub max_entries_per_shard: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            shard_count: 16,
            max_entries_per_shard: 0,
        }
    }
}

/// Builder for creating cache instances.
pub struct CacheBuilder<V> {
    config: CacheConfig,
    listener: Option<EvictionListener<V>>,
    observer: Option<Arc<dyn LookupObserver>>,
}

impl<V> CacheBuilder<V> {
    /// Starts from [`CacheConfig::default`].
    pub fn new() -> Self {
        Self::from_config(CacheConfig::default())
    }

    pub fn from_config(config: CacheConfig) -> Self {
        Self {
            config,
            listener: None,
            observer: None,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn max_bytes(mut self, max_bytes: usize) -> Self {
        self.config.max_bytes = max_bytes;
        self
    }

    pub fn shard_count(mut self, shard_count: usize) -> Self {
        self.config.shard_count = shard_count;
        self
    }

    pub fn max_entries_per_shard(mut self, max_entries: usize) -> Self {
        self.config.max_entries_per_shard = max_entries;
        self
    }

    /// Callback for every entry the built cache removes.
    pub fn listener(self, listener: impl Fn(String, V) + Send + Sync + 'static) -> Self
    where
        V: 'static,
    {
        self.shared_listener(Arc::new(listener))
    }

    pub fn shared_listener(mut self, listener: EvictionListener<V>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Lookup sink attached by [`build_guarded`](Self::build_guarded).
    pub fn observer(mut self, observer: Arc<dyn LookupObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Logs guarded lookups through a [`TracingObserver`] tagged `name`.
    pub fn trace_lookups(self, name: impl Into<String>) -> Self {
        self.observer(Arc::new(TracingObserver::new(name)))
    }

    /// Builds a byte-budgeted cache with the given policy.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hotcache::builder::{CacheBuilder, Policy};
    /// use hotcache::traits::Cache;
    ///
    /// for policy in [Policy::Fifo, Policy::Lru, Policy::Lfu] {
    ///     let mut cache = CacheBuilder::new().build(policy, |v: &Vec<u8>| v.len());
    ///     cache.insert("k".into(), vec![1, 2, 3]);
    ///     assert_eq!(cache.policy(), policy);
    ///     assert_eq!(cache.used_bytes(), 3);
    /// }
    /// ```
    pub fn build<F>(self, policy: Policy, size_of: F) -> PolicyCache<V, F>
    where
        F: Fn(&V) -> usize,
    {
        let max_bytes = self.config.max_bytes;
        match (policy, self.listener) {
            (Policy::Fifo, None) => PolicyCache::Fifo(FifoCache::new(max_bytes, size_of)),
            (Policy::Fifo, Some(l)) => {
                PolicyCache::Fifo(FifoCache::new(max_bytes, size_of).with_shared_listener(l))
            },
            (Policy::Lru, None) => PolicyCache::Lru(LruCache::new(max_bytes, size_of)),
            (Policy::Lru, Some(l)) => {
                PolicyCache::Lru(LruCache::new(max_bytes, size_of).with_shared_listener(l))
            },
            (Policy::Lfu, None) => PolicyCache::Lfu(LfuCache::new(max_bytes, size_of)),
            (Policy::Lfu, Some(l)) => {
                PolicyCache::Lfu(LfuCache::new(max_bytes, size_of).with_shared_listener(l))
            },
        }
    }

    /// Builds a byte-budgeted cache and wraps it in a [`GuardedCache`],
    /// attaching the observer if one was set.
    #[cfg(feature = "concurrency")]
    pub fn build_guarded<F>(
        mut self,
        policy: Policy,
        size_of: F,
    ) -> GuardedCache<PolicyCache<V, F>, V>
    where
        F: Fn(&V) -> usize,
    {
        let observer = self.observer.take();
        let guarded = GuardedCache::new(self.build(policy, size_of));
        match observer {
            Some(observer) => guarded.with_observer(observer),
            None => guarded,
        }
    }

    /// Builds a sharded LRU cache from `shard_count` and
    /// `max_entries_per_shard`. The byte budget does not apply.
    #[cfg(feature = "concurrency")]
    pub fn build_sharded(self) -> Result<ShardedLruCache<V>, ConfigError> {
        let cache = ShardedLruCache::new(
            self.config.max_entries_per_shard,
            self.config.shard_count,
        )?;
        Ok(match self.listener {
            Some(listener) => cache.with_shared_listener(listener),
            None => cache,
        })
    }
}

impl<V> Default for CacheBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for CacheBuilder<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("config", &self.config)
            .field("listener", &self.listener.is_some())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Any byte-budgeted policy behind one type.
pub enum PolicyCache<V, F> {
    Fifo(FifoCache<V, F>),
    Lru(LruCache<V, F>),
    Lfu(LfuCache<V, F>),
}

impl<V, F> PolicyCache<V, F>
where
    F: Fn(&V) -> usize,
{
    pub fn policy(&self) -> Policy {
        match self {
            PolicyCache::Fifo(_) => Policy::Fifo,
            PolicyCache::Lru(_) => Policy::Lru,
            PolicyCache::Lfu(_) => Policy::Lfu,
        }
    }

    pub fn used_bytes(&self) -> usize {
        match self {
            PolicyCache::Fifo(fifo) => fifo.used_bytes(),
            PolicyCache::Lru(lru) => lru.used_bytes(),
            PolicyCache::Lfu(lfu) => lfu.used_bytes(),
        }
    }

    pub fn max_bytes(&self) -> usize {
        match self {
            PolicyCache::Fifo(fifo) => fifo.max_bytes(),
            PolicyCache::Lru(lru) => lru.max_bytes(),
            PolicyCache::Lfu(lfu) => lfu.max_bytes(),
        }
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        match self {
            PolicyCache::Fifo(fifo) => fifo.check_invariants(),
            PolicyCache::Lru(lru) => lru.check_invariants(),
            PolicyCache::Lfu(lfu) => lfu.check_invariants(),
        }
    }
}

impl<V, F> Cache<V> for PolicyCache<V, F>
where
    F: Fn(&V) -> usize,
{
    fn insert(&mut self, key: String, value: V) -> Option<V> {
        match self {
            PolicyCache::Fifo(fifo) => fifo.insert(key, value),
            PolicyCache::Lru(lru) => lru.insert(key, value),
            PolicyCache::Lfu(lfu) => lfu.insert(key, value),
        }
    }

    fn get(&mut self, key: &str) -> Option<&V> {
        match self {
            PolicyCache::Fifo(fifo) => fifo.get(key),
            PolicyCache::Lru(lru) => lru.get(key),
            PolicyCache::Lfu(lfu) => lfu.get(key),
        }
    }

    fn peek(&self, key: &str) -> Option<&V> {
        match self {
            PolicyCache::Fifo(fifo) => fifo.peek(key),
            PolicyCache::Lru(lru) => lru.peek(key),
            PolicyCache::Lfu(lfu) => lfu.peek(key),
        }
    }

    fn contains(&self, key: &str) -> bool {
        match self {
            PolicyCache::Fifo(fifo) => fifo.contains(key),
            PolicyCache::Lru(lru) => lru.contains(key),
            PolicyCache::Lfu(lfu) => lfu.contains(key),
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        match self {
            PolicyCache::Fifo(fifo) => fifo.remove(key),
            PolicyCache::Lru(lru) => lru.remove(key),
            PolicyCache::Lfu(lfu) => lfu.remove(key),
        }
    }

    fn evict_oldest(&mut self) -> bool {
        match self {
            PolicyCache::Fifo(fifo) => fifo.evict_oldest(),
            PolicyCache::Lru(lru) => lru.evict_oldest(),
            PolicyCache::Lfu(lfu) => lfu.evict_oldest(),
        }
    }

    fn len(&self) -> usize {
        match self {
            PolicyCache::Fifo(fifo) => fifo.len(),
            PolicyCache::Lru(lru) => lru.len(),
            PolicyCache::Lfu(lfu) => lfu.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            PolicyCache::Fifo(fifo) => fifo.clear(),
            PolicyCache::Lru(lru) => lru.clear(),
            PolicyCache::Lfu(lfu) => lfu.clear(),
        }
    }

    fn lookup_reorders(&self) -> bool {
        match self {
            PolicyCache::Fifo(fifo) => fifo.lookup_reorders(),
            PolicyCache::Lru(lru) => lru.lookup_reorders(),
            PolicyCache::Lfu(lfu) => lfu.lookup_reorders(),
        }
    }
}

impl<V, F> fmt::Debug for PolicyCache<V, F>
where
    F: Fn(&V) -> usize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyCache::Fifo(fifo) => fmt::Debug::fmt(fifo, f),
            PolicyCache::Lru(lru) => fmt::Debug::fmt(lru, f),
            PolicyCache::Lfu(lfu) => fmt::Debug::fmt(lfu, f),
        }
    }
}
