use lazy_static::lazy_static;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ==== Crowd Analytics Metrics ====
    pub static ref CROWD_ANALYTICS_REPORTS: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new(
                "crowd_analytics_reports_total",
                "Total number of crowd reports generated",
            ),
            &["status"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref CROWD_ANALYTICS_REPORT_DURATION: Histogram = {
        let metric = Histogram::with_opts(
            HistogramOpts::new(
                "crowd_analytics_report_duration_seconds",
                "Time spent generating a crowd report",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref CROWD_ANALYTICS_BOTTLENECKS: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new(
                "crowd_analytics_bottlenecks_total",
                "Total number of bottleneck periods detected",
            ),
            &["severity"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref CROWD_ANALYTICS_SAMPLES: IntCounter = {
        let metric = IntCounter::new(
            "crowd_analytics_samples_processed_total",
            "Total number of sampled frames analyzed",
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };
}

/// Helper function to encode metrics for Prometheus scraping
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| {
        prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e))
    })
}
