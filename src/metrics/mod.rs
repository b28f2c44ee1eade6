//! Lookup statistics and the sinks that consume them.
//!
//! ```text
//!   GuardedCache ──on_hit/on_miss──► LookupObserver (TracingObserver, ...)
//!        │
//!        └──stats()──► CacheStats ──export──► MetricsExporter (PrometheusTextExporter)
//! ```

pub mod exporter;
pub mod observer;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use observer::TracingObserver;
pub use snapshot::CacheStats;
pub use traits::{LookupObserver, MetricsExporter};
