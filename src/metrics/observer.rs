use tracing::{debug, trace};

use crate::metrics::traits::LookupObserver;

/// Emits a `tracing` event per lookup.
///
/// Hits are logged at `debug`, misses at `trace`. `name` is attached to every
/// event so several caches can share one subscriber.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    name: String,
}

impl TracingObserver {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("cache")
    }
}

impl LookupObserver for TracingObserver {
    fn on_hit(&self, key: &str) {
        debug!(cache = %self.name, key, "cache hit");
    }

    fn on_miss(&self, key: &str) {
        trace!(cache = %self.name, key, "cache miss");
    }
}
