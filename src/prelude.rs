pub use crate::builder::{CacheBuilder, Policy, PolicyCache};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "concurrency")]
pub use crate::guard::GuardedCache;
pub use crate::metrics::{CacheStats, LookupObserver};
pub use crate::policy::fifo::FifoCache;
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lru::LruCache;
#[cfg(feature = "concurrency")]
pub use crate::policy::sharded::ShardedLruCache;
pub use crate::traits::{Cache, ConcurrentCache, EvictionListener};
