//! Metrics collection and exposition.
//!
//! # Metrics
//! - `include_fetches_total` (counter): outbound include fetches by outcome
//! - `include_fetch_duration_seconds` (histogram): fetch latency
//! - `include_failures_total` (counter): responses replaced by an inclusion failure
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one outbound fetch. `outcome` is `ok`, `transport_error` or `parse_error`.
pub fn record_fetch(outcome: &'static str, start: Instant) {
    metrics::counter!("include_fetches_total", "outcome" => outcome).increment(1);
    metrics::histogram!("include_fetch_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a response that failed inclusion.
pub fn record_inclusion_failure() {
    metrics::counter!("include_failures_total").increment(1);
}
