/// Point-in-time lookup counters of a guarded cache.
///
/// `hits <= lookups` always holds for a snapshot taken through
/// [`GuardedCache::stats`](crate::guard::GuardedCache::stats).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub lookups: u64,
}

impl CacheStats {
    pub fn misses(&self) -> u64 {
        self.lookups.saturating_sub(self.hits)
    }

    /// Fraction of lookups that hit, or `0.0` before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }

    /// Counters accumulated since `earlier`.
    pub fn since(&self, earlier: &CacheStats) -> CacheStats {
        CacheStats {
            hits: self.hits.saturating_sub(earlier.hits),
            lookups: self.lookups.saturating_sub(earlier.lookups),
        }
    }
}
