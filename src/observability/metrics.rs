//! Metrics collection and exposition.
//!
//! # Metrics
//! - `storage_request_attempts_total` (counter): attempts by outcome
//! - `storage_request_try_duration_seconds` (histogram): try latency by outcome
//!
//! Without an installed recorder these calls are no-ops.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::pipeline::AttemptOutcome;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished attempt.
pub fn record_attempt(outcome: AttemptOutcome, try_duration: Duration) {
    let outcome = outcome.as_str();
    counter!("storage_request_attempts_total", "outcome" => outcome).increment(1);
    histogram!("storage_request_try_duration_seconds", "outcome" => outcome)
        .record(try_duration.as_secs_f64());
}
