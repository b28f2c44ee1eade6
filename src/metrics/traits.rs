//! # Metrics Traits
//!
//! Recording and export are separate concerns:
//!
//! ```text
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ LookupObserver               │    │ MetricsExporter<S>           │
//!   │ (per-lookup events, pushed   │    │ (publishes a snapshot to a   │
//!   │  by the guard)               │    │  monitoring backend)         │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```
//!
//! Observers run on the lookup path after the guard lock is released, so an
//! observer may read the cache it observes. They should still be cheap.

/// Receives one event per lookup made through a
/// [`GuardedCache`](crate::guard::GuardedCache).
pub trait LookupObserver: Send + Sync {
    fn on_hit(&self, key: &str);

    fn on_miss(&self, key: &str) {
        let _ = key;
    }
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
