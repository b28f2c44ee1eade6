//! Eviction policies.
//!
//! | Policy            | Bound         | Victim                             | `get` reorders |
//! |-------------------|---------------|------------------------------------|----------------|
//! | `FifoCache`       | bytes         | earliest inserted or updated       | no             |
//! | `LruCache`        | bytes         | least recently read or written     | yes            |
//! | `LfuCache`        | bytes         | lowest weight, then oldest touch   | yes            |
//! | `ShardedLruCache` | entries/shard | shard front with the oldest stamp  | yes            |

pub mod fifo;
pub mod lfu;
pub mod lru;
#[cfg(feature = "concurrency")]
pub mod sharded;
