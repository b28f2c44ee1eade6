//! # FIFO Cache
//!
//! Evicts in insertion order under a byte budget.
//!
//! ```text
//!   insert a, b, c                 get(a)                    insert a (update)
//!   front ──► [a][b][c] ◄── back   front ──► [a][b][c]       front ──► [b][c][a]
//!             ▲ next victim                  (unchanged)               ▲ next victim
//! ```
//!
//! Lookups never change the order. Re-inserting an existing key, however,
//! moves it to the back, so an updated entry outlives entries inserted after
//! its original insertion. That is what makes this cache useful for
//! "refresh on write" workloads, and it is the only way the order changes
//! short of removal.
//!
//! ## Example
//!
//! ```
//! use hotcache::policy::fifo::FifoCache;
//! use hotcache::traits::Cache;
//!
//! let mut cache = FifoCache::new(10, |v: &String| v.len());
//! cache.insert("a".into(), "aaaaa".into());
//! cache.insert("b".into(), "bbbbb".into());
//! cache.get("a");
//! cache.insert("c".into(), "ccccc".into());
//!
//! assert!(!cache.contains("a"));
//! assert!(cache.contains("b") && cache.contains("c"));
//! ```
//!
//! ## Thread Safety
//!
//! Not thread-safe. Wrap in [`GuardedCache`](crate::guard::GuardedCache)
//! for shared access.

use std::fmt;

use crate::error::InvariantError;
use crate::store::linked::LinkedStore;
use crate::traits::{Cache, EvictionListener};

/// Byte-budgeted first-in-first-out cache.
pub struct FifoCache<V, F> {
    store: LinkedStore<V, F>,
}

impl<V, F> FifoCache<V, F>
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
        self.with_shared_listener(std::sync::Arc::new(listener))
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

    /// Key that `evict_oldest` would remove next.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.store.front_key()
    }

    /// Keys from oldest to newest.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.store.keys()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.store.check_invariants()
    }
}

impl<V, F> Cache<V> for FifoCache<V, F>
where
    F: Fn(&V) -> usize,
{
    fn insert(&mut self, key: String, value: V) -> Option<V> {
        self.store.insert(key, value)
    }

    fn get(&mut self, key: &str) -> Option<&V> {
        self.store.lookup(key, false)
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

    fn lookup_reorders(&self) -> bool {
        false
    }
}

impl<V, F> fmt::Debug for FifoCache<V, F>
where
    F: Fn(&V) -> usize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FifoCache")
            .field("len", &self.store.len())
            .field("used_bytes", &self.store.used_bytes())
            .field("max_bytes", &self.store.max_bytes())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    type Evicted = Arc<Mutex<Vec<(String, u32)>>>;

    fn five_bytes(_: &u32) -> usize {
        5
    }

    fn recording(max_bytes: usize) -> (FifoCache<u32, fn(&u32) -> usize>, Evicted) {
        let evicted: Evicted = Arc::default();
        let sink = Arc::clone(&evicted);
        let cache = FifoCache::new(max_bytes, five_bytes as fn(&u32) -> usize)
            .with_listener(move |k, v| sink.lock().unwrap().push((k, v)));
        (cache, evicted)
    }

    #[test]
    fn evicts_in_insertion_order() {
        let (mut cache, evicted) = recording(10);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        cache.insert("c".into(), 3);

        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(*evicted.lock().unwrap(), vec![("a".to_string(), 1)]);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn get_does_not_reorder() {
        let (mut cache, _) = recording(10);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        assert_eq!(cache.get("a"), Some(&1));
        assert_eq!(cache.get("a"), Some(&1));
        assert_eq!(cache.peek_oldest(), Some("a"));

        cache.insert("c".into(), 3);
        assert!(!cache.contains("a"));
        assert!(!cache.lookup_reorders());
    }

    #[test]
    fn update_moves_key_to_back() {
        let (mut cache, evicted) = recording(15);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        cache.insert("c".into(), 3);

        assert_eq!(cache.insert("a".into(), 10), Some(1));
        assert!(evicted.lock().unwrap().is_empty());
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["b", "c", "a"]);

        cache.insert("d".into(), 4);
        assert!(!cache.contains("b"));
        assert_eq!(cache.peek("a"), Some(&10));
    }

    #[test]
    fn remove_and_evict_oldest_notify_once() {
        let (mut cache, evicted) = recording(0);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);

        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
        assert!(cache.evict_oldest());
        assert!(!cache.evict_oldest());

        assert_eq!(
            *evicted.lock().unwrap(),
            vec![("a".to_string(), 1), ("b".to_string(), 2)]
        );
        assert_eq!(cache.used_bytes(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_does_not_notify() {
        let (mut cache, evicted) = recording(0);
        cache.insert("a".into(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert!(evicted.lock().unwrap().is_empty());
    }
}
