//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_upstream_requests_total` (counter): calls to Xero by operation, status
//! - `bridge_upstream_request_duration_seconds` (histogram): upstream latency
//! - `bridge_oauth_events_total` (counter): connect / callback / refresh / logout outcomes
//! - `bridge_active_sessions` (gauge): records held by the session store
//!
//! Recording is a no-op until a recorder is installed, so library code and
//! tests can call these freely.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one call to a Xero endpoint.
pub fn record_upstream_call(operation: &'static str, status: u16, start: Instant) {
    counter!(
        "bridge_upstream_requests_total",
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("bridge_upstream_request_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

/// Record an OAuth lifecycle event (e.g. "callback_success").
pub fn record_oauth_event(event: &'static str) {
    counter!("bridge_oauth_events_total", "event" => event).increment(1);
}

pub fn record_active_sessions(count: usize) {
    gauge!("bridge_active_sessions").set(count as f64);
}
