use prometheus::{Counter, Histogram, Registry, TextEncoder, HistogramOpts, Opts};
use tracing::error;

lazy_static::lazy_static! {
    // Export metrics
    pub static ref PAGES_FETCHED: Counter = Counter::with_opts(
        Opts::new("sift_pages_fetched_total", "Total number of message pages fetched")
    ).unwrap();

    pub static ref MESSAGES_EXPORTED: Counter = Counter::with_opts(
        Opts::new("sift_messages_exported_total", "Total number of unique messages exported")
    ).unwrap();

    pub static ref WINDOWS_SKIPPED: Counter = Counter::with_opts(
        Opts::new("sift_windows_skipped_total", "Windows skipped because they held no messages")
    ).unwrap();

    // Delivery metrics
    pub static ref DIGESTS_DELIVERED: Counter = Counter::with_opts(
        Opts::new("sift_digests_delivered_total", "Digests handed to every distributor successfully")
    ).unwrap();

    pub static ref DELIVERY_FAILURES: Counter = Counter::with_opts(
        Opts::new("sift_delivery_failures_total", "Individual distributor failures")
    ).unwrap();

    // Latency metrics
    pub static ref DISCORD_API_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new("sift_discord_api_duration_seconds", "Time spent fetching one message page")
    ).unwrap();

    pub static ref SUMMARIZE_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new("sift_summarize_duration_seconds", "Time spent in one summarization call")
    ).unwrap();
}

pub struct MetricsRegistry {
    registry: Registry,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        let registry = Registry::new();

        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(PAGES_FETCHED.clone()),
            Box::new(MESSAGES_EXPORTED.clone()),
            Box::new(WINDOWS_SKIPPED.clone()),
            Box::new(DIGESTS_DELIVERED.clone()),
            Box::new(DELIVERY_FAILURES.clone()),
            Box::new(DISCORD_API_DURATION.clone()),
            Box::new(SUMMARIZE_DURATION.clone()),
        ];
        for collector in collectors {
            if let Err(e) = registry.register(collector) {
                error!("Failed to register metric: {}", e);
            }
        }

        Self { registry }
    }

    pub fn gather_metrics(&self) -> String {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();
        encoder.encode_to_string(&metric_families).unwrap_or_else(|e| {
            error!("Failed to encode metrics: {}", e);
            String::new()
        })
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
