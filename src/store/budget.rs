//! Byte-budget accounting shared by the FIFO, LRU, and LFU stores.
//!
//! A [`ByteBudget`] tracks the total size of the values a store holds, as
//! reported by a caller-supplied size oracle. It never evicts anything
//! itself; stores ask [`is_over`](ByteBudget::is_over) after each write and
//! pick victims by their own policy.

/// Running total of value sizes against an optional ceiling.
///
/// `max_bytes == 0` means unbounded.
#[derive(Debug)]
pub struct ByteBudget<F> {
    max_bytes: usize,
    used_bytes: usize,
    size_of: F,
}

impl<F> ByteBudget<F> {
    pub fn new(max_bytes: usize, size_of: F) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            size_of,
        }
    }

    /// Size of `value` according to the oracle.
    #[inline]
    pub fn measure<V>(&self, value: &V) -> usize
    where
        F: Fn(&V) -> usize,
    {
        (self.size_of)(value)
    }

    #[inline]
    pub fn charge(&mut self, bytes: usize) {
        self.used_bytes = self.used_bytes.saturating_add(bytes);
    }

    #[inline]
    pub fn release(&mut self, bytes: usize) {
        debug_assert!(bytes <= self.used_bytes, "released more than charged");
        self.used_bytes = self.used_bytes.saturating_sub(bytes);
    }

    /// Swaps an entry's accounted size from `old` to `new`.
    #[inline]
    pub fn resize(&mut self, old: usize, new: usize) {
        self.release(old);
        self.charge(new);
    }

    /// `true` when bounded and the running total exceeds the ceiling.
    #[inline]
    pub fn is_over(&self) -> bool {
        self.max_bytes > 0 && self.used_bytes > self.max_bytes
    }

    /// `true` when a single entry of `bytes` could never fit.
    #[inline]
    pub fn exceeds_whole_budget(&self, bytes: usize) -> bool {
        self.max_bytes > 0 && bytes > self.max_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn reset(&mut self) {
        self.used_bytes = 0;
    }
}
