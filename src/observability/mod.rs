//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, incl. handler print output)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (tracing fmt layer, filtered by RUST_LOG)
//!     → Prometheus scrape endpoint (own listener, optional)
//! ```
//!
//! # Design Decisions
//! - Metrics are cheap (atomic increments) and never required: everything
//!   works with no exporter installed
//! - HTTP request/response tracing comes from tower-http's TraceLayer

pub mod logging;
pub mod metrics;
