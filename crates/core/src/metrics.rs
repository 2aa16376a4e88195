//! Metrics definitions for the query layer.
//!
//! Metrics are collected using the `metrics` crate and can be exported
//! to Prometheus via `metrics-exporter-prometheus`. Recording never
//! influences results.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "connection_queries_total",
        "Total number of paginated connection queries served"
    );
    describe_counter!(
        "connection_argument_errors_total",
        "Total number of connection queries rejected for invalid arguments"
    );
    describe_counter!(
        "uri_resolutions_total",
        "Total number of URI resolutions by outcome"
    );
    describe_histogram!(
        "uri_resolution_duration_seconds",
        "Time taken to resolve a URI in seconds"
    );
}

/// Record a served connection query.
///
/// # Arguments
/// * `connection` - The connection tag (e.g. "comment")
/// * `direction` - "forward" or "backward"
pub fn record_connection_query(connection: &str, direction: &str) {
    counter!(
        "connection_queries_total",
        "connection" => connection.to_string(),
        "direction" => direction.to_string()
    )
    .increment(1);
}

/// Record a connection query rejected before reaching the store.
pub fn record_argument_error(connection: &str) {
    counter!("connection_argument_errors_total", "connection" => connection.to_string())
        .increment(1);
}

/// Record the outcome of a URI resolution.
///
/// # Arguments
/// * `outcome` - "node", "none", "external" or "error"
pub fn record_uri_resolution(outcome: &'static str) {
    counter!("uri_resolutions_total", "outcome" => outcome).increment(1);
}

/// A timer that records resolution duration when dropped.
pub struct ResolutionTimer {
    start: Instant,
}

impl ResolutionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for ResolutionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ResolutionTimer {
    fn drop(&mut self) {
        histogram!("uri_resolution_duration_seconds").record(self.start.elapsed().as_secs_f64());
    }
}
