//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pagetree_requests_total` (counter): requests by method, status, outcome
//! - `pagetree_request_duration_seconds` (histogram): latency distribution
//! - `pagetree_table_rebuilds_total` (counter): dev-mode table rebuilds
//! - `pagetree_routes` (gauge): routes in the current table
//! - `pagetree_handlers_cached` (gauge): compiled handler modules
//!
//! # Design Decisions
//! - Metric updates are plain macro calls; they work with or without an
//!   installed exporter, so tests and library users pay nothing
//! - The exporter runs its own listener instead of mounting a route on the
//!   application server, keeping the catch-all routes unshadowed

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Installs the Prometheus exporter on its own listener.
///
/// Failure is logged and tolerated; the engine runs fine without metrics.
pub fn init_exporter(address: SocketAddr) {
    match PrometheusBuilder::new()
        .with_http_listener(address)
        .install()
    {
        Ok(()) => tracing::info!(address = %address, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Records one dispatched request.
pub fn record_request(method: &str, status: u16, outcome: &str, start: Instant) {
    metrics::counter!(
        "pagetree_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);
    metrics::histogram!("pagetree_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

/// Records a dev-mode table rebuild and the new route count.
pub fn record_rebuild(routes: usize) {
    metrics::counter!("pagetree_table_rebuilds_total").increment(1);
    record_routes(routes);
}

/// Records the number of routes in the published table.
pub fn record_routes(routes: usize) {
    metrics::gauge!("pagetree_routes").set(routes as f64);
}

/// Records the handler cache size.
pub fn record_handlers_cached(count: usize) {
    metrics::gauge!("pagetree_handlers_cached").set(count as f64);
}
