//! Error types for the hotcache library.
//!
//! Cache operations themselves never fail: a missing key is `None`, removing
//! an absent key is a no-op. Errors only come from two places:
//!
//! - [`ConfigError`]: construction-time validation (e.g. a shard count that
//!   is not a power of two).
//! - [`InvariantError`]: returned by `check_invariants` methods when a
//!   store's internal bookkeeping disagrees with itself.
//!
//! ## Example Usage
//!
//! ```
//! use hotcache::error::ConfigError;
//! use hotcache::policy::sharded::ShardedLruCache;
//!
//! let ok: Result<ShardedLruCache<String>, ConfigError> = ShardedLruCache::new(128, 16);
//! assert!(ok.is_ok());
//!
//! let bad = ShardedLruCache::<String>::new(128, 10);
//! assert!(bad.is_err());
//! ```

use thiserror::Error;

/// Error returned when internal cache invariants are violated.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Error returned when cache configuration parameters are invalid.
///
/// # Example
///
/// ```
/// use hotcache::policy::sharded::ShardedLruCache;
///
/// let err = ShardedLruCache::<u64>::new(16, 0).unwrap_err();
/// assert!(err.to_string().contains("shard count"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}
