use std::io::Write;

use parking_lot::Mutex;

use crate::metrics::snapshot::CacheStats;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for cache statistics.
///
/// This exporter writes in the Prometheus text exposition format so it can be
/// scraped by Prometheus or forwarded to an OpenTelemetry collector. Write
/// errors are ignored.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_sample(&self, kind: &str, name: &str, value: impl std::fmt::Display) {
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<CacheStats> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &CacheStats) {
        self.write_sample("counter", &self.metric_name("lookups_total"), snapshot.lookups);
        self.write_sample("counter", &self.metric_name("hits_total"), snapshot.hits);
        self.write_sample("counter", &self.metric_name("misses_total"), snapshot.misses());
        self.write_sample("gauge", &self.metric_name("hit_ratio"), snapshot.hit_rate());
    }
}
