use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

pub struct MetricsCollector {
    registry: Registry,

    // Dispatcher metrics
    pub requests_total: CounterVec,
    pub request_duration: HistogramVec,

    // Startup metrics
    pub seeded_records: CounterVec,
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests_total = CounterVec::new(
            Opts::new("restmock_requests_total", "Total number of dispatched requests"),
            &["operation", "endpoint", "status"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "restmock_request_duration_seconds",
                "Dispatcher operation duration in seconds",
            ),
            &["operation", "endpoint"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let seeded_records = CounterVec::new(
            Opts::new("restmock_seeded_records_total", "Records generated at startup"),
            &["endpoint"],
        )?;
        registry.register(Box::new(seeded_records.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
            seeded_records,
        })
    }

    /// Records one finished dispatcher operation.
    pub fn observe(&self, operation: &str, endpoint: &str, status: u16, seconds: f64) {
        self.requests_total
            .with_label_values(&[operation, endpoint, &status.to_string()])
            .inc();
        self.request_duration
            .with_label_values(&[operation, endpoint])
            .observe(seconds);
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

pub struct MetricsHandler {
    collector: Arc<MetricsCollector>,
}

impl MetricsHandler {
    pub fn new(collector: Arc<MetricsCollector>) -> Self {
        Self { collector }
    }

    pub async fn metrics(&self) -> String {
        self.collector.encode().unwrap_or_else(|e| {
            tracing::error!("Failed to encode metrics: {}", e);
            String::from("# Error encoding metrics\n")
        })
    }
}
