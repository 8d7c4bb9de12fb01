//! Prometheus metrics for the capture server.

use axum::http::Method;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

/// Labels for HTTP request metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabelsWithStatus {
    pub method: HttpMethod,
    pub endpoint: String,
    pub status: u16,
}

/// HTTP method label value.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum HttpMethod {
    Get,
    Post,
    Options,
    Other,
}

impl From<&Method> for HttpMethod {
    fn from(method: &Method) -> Self {
        match *method {
            Method::GET => HttpMethod::Get,
            Method::POST => HttpMethod::Post,
            Method::OPTIONS => HttpMethod::Options,
            _ => HttpMethod::Other,
        }
    }
}

/// Container for all Prometheus metrics.
///
/// Counters are registered without the `_total` suffix; the encoder appends
/// it to sample lines.
pub struct Metrics {
    registry: Registry,

    /// Counter of entries appended to a log.
    pub capture_appends_total: Counter,

    /// Counter of payloads skipped because the topic already held them.
    pub capture_duplicates_total: Counter,

    /// Counter of request body bytes accepted as JSON.
    pub capture_bytes_received_total: Counter,

    /// Counter of HTTP requests.
    pub http_requests_total: Family<HttpLabelsWithStatus, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics registry with all metrics registered.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let capture_appends_total = Counter::default();
        registry.register(
            "capture_appends",
            "Total number of entries appended to capture logs",
            capture_appends_total.clone(),
        );

        let capture_duplicates_total = Counter::default();
        registry.register(
            "capture_duplicates",
            "Total number of duplicate payloads skipped",
            capture_duplicates_total.clone(),
        );

        let capture_bytes_received_total = Counter::default();
        registry.register(
            "capture_bytes_received",
            "Total number of payload bytes received",
            capture_bytes_received_total.clone(),
        );

        let http_requests_total = Family::<HttpLabelsWithStatus, Counter>::default();
        registry.register(
            "http_requests",
            "Total number of HTTP requests",
            http_requests_total.clone(),
        );

        Self {
            registry,
            capture_appends_total,
            capture_duplicates_total,
            capture_bytes_received_total,
            http_requests_total,
        }
    }

    /// Encode all metrics to Prometheus text format.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &self.registry)
            .expect("encoding metrics should not fail");
        buffer
    }
}
