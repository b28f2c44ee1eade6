//! hotcache: in-process caches with byte budgets and a sharded concurrent LRU.
//!
//! ```text
//!   traits::Cache (&mut self)              traits::ConcurrentCache (&self)
//!   ├── policy::fifo::FifoCache            ├── policy::sharded::ShardedLruCache
//!   ├── policy::lru::LruCache              └── guard::GuardedCache<C: Cache>
//!   ├── policy::lfu::LfuCache
//!   └── builder::PolicyCache
//! ```
//!
//! Single-threaded stores evict by a shared byte budget measured with a
//! caller-supplied size function. The sharded store bounds entries per shard
//! instead. Evictions are reported through [`tracing`] events and an optional
//! [`EvictionListener`](traits::EvictionListener).

pub mod builder;
pub mod ds;
pub mod error;
#[cfg(feature = "concurrency")]
pub mod guard;
pub mod hash;
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod store;
pub mod traits;

pub use crate::builder::{CacheBuilder, CacheConfig, Policy, PolicyCache};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "concurrency")]
pub use crate::guard::GuardedCache;
pub use crate::hash::{Fnv1a, FxKeyHasher, KeyHasher};
pub use crate::metrics::{CacheStats, LookupObserver, TracingObserver};
pub use crate::policy::fifo::FifoCache;
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lru::LruCache;
#[cfg(feature = "concurrency")]
pub use crate::policy::sharded::ShardedLruCache;
pub use crate::traits::{Cache, ConcurrentCache, DEFAULT_MAX_BYTES, EvictionListener};
