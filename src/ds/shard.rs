//! Mask-based key-to-shard routing.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shard Selection Flow                            │
//! │                                                                         │
//! │   "user:123"                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   ┌───────────────────────────────────────────────────────────────┐     │
//! │   │  ShardSelector { mask: 3, hasher: Fnv1a }                     │     │
//! │   │                                                               │     │
//! │   │  1. h = hasher.hash_key("user:123")                           │     │
//! │   │  2. shard = h & mask                                          │     │
//! │   └───────────────────────────────────────────────────────────────┘     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   ┌─────────┬─────────┬─────────┬─────────┐                             │
//! │   │ Shard 0 │ Shard 1 │ Shard 2 │ Shard 3 │                             │
//! │   └─────────┴─────────┴─────────┴─────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Masking only addresses every shard when the shard count is a power of two,
//! so [`ShardSelector::new`] rejects any other count instead of silently
//! leaving shards unreachable.
//!
//! ## Example Usage
//!
//! ```
//! use hotcache::ds::ShardSelector;
//! use hotcache::hash::Fnv1a;
//!
//! let selector = ShardSelector::new(4, Fnv1a).unwrap();
//! let shard = selector.shard_for_key("user:123");
//! assert!(shard < 4);
//! assert_eq!(selector.shard_for_key("user:123"), shard);
//!
//! assert!(ShardSelector::new(6, Fnv1a).is_err());
//! ```

use crate::error::ConfigError;
use crate::hash::KeyHasher;

/// Routes keys to shard indices with `hash(key) & (shards - 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector<H> {
    mask: u64,
    hasher: H,
}

impl<H: KeyHasher> ShardSelector<H> {
    /// Creates a selector for `shards` shards.
    ///
    /// Fails unless `shards` is a non-zero power of two.
    pub fn new(shards: usize, hasher: H) -> Result<Self, ConfigError> {
        if shards == 0 {
            return Err(ConfigError::new("shard count must be greater than zero"));
        }
        if !shards.is_power_of_two() {
            return Err(ConfigError::new(format!(
                "shard count must be a power of two, got {shards}"
            )));
        }
        Ok(Self {
            mask: shards as u64 - 1,
            hasher,
        })
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.mask as usize + 1
    }

    /// Maps a key to a shard index in `[0, shard_count)`.
    #[inline]
    pub fn shard_for_key(&self, key: &str) -> usize {
        (self.hasher.hash_key(key) & self.mask) as usize
    }
}
