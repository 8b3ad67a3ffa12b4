use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::observability::events::{ClientEvent, EventSink, Operation};

static SUCCESS_MSG: &str = "success";
static RATE_LIMITED_MSG: &str = "rate_limited";
static ERROR_MSG: &str = "error";

/// Prometheus counters fed from client events
#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token metrics
    pub token_acquisitions: IntCounter,
    pub token_failures: IntCounter,

    // Catalog metrics
    pub catalog_requests: IntCounterVec,
    pub catalog_request_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("digikey".into()), None)?;

        let metrics = Self {
            token_acquisitions: IntCounter::new("token_acquisitions_total", "Access tokens acquired")?,
            token_failures: IntCounter::new("token_failures_total", "Token endpoint failures")?,
            catalog_requests: IntCounterVec::new(Opts::new("catalog_requests_total", "Catalog requests by outcome"), &["operation", "outcome"])?,
            catalog_request_duration: HistogramVec::new(HistogramOpts::new("catalog_request_duration_seconds", "Catalog request duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]), &["operation"])?,
            registry,
        };

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_acquisitions.clone()))?;
        reg.register(Box::new(metrics.token_failures.clone()))?;
        reg.register(Box::new(metrics.catalog_requests.clone()))?;
        reg.register(Box::new(metrics.catalog_request_duration.clone()))?;

        Ok(metrics)
    }

    /// Prometheus text exposition of everything gathered so far
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    fn observe_request(&self, operation: &Operation, outcome: &str, elapsed_secs: f64) {
        self.catalog_requests.with_label_values(&[operation.as_str(), outcome]).inc();
        self.catalog_request_duration.with_label_values(&[operation.as_str()]).observe(elapsed_secs);
    }
}

impl EventSink for Metrics {
    fn on_event(&self, event: &ClientEvent) {
        match event {
            ClientEvent::TokenAcquired { .. } => self.token_acquisitions.inc(),
            ClientEvent::AuthenticationFailed { .. } => self.token_failures.inc(),
            ClientEvent::SearchSucceeded { operation, elapsed_secs } => {
                self.observe_request(operation, SUCCESS_MSG, *elapsed_secs)
            }
            ClientEvent::RateLimited { operation, elapsed_secs } => {
                self.observe_request(operation, RATE_LIMITED_MSG, *elapsed_secs)
            }
            ClientEvent::SearchFailed { operation, elapsed_secs, .. } => {
                self.observe_request(operation, ERROR_MSG, *elapsed_secs)
            }
        }
    }
}
