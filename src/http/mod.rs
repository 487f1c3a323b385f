//! HTTP subsystem: the server edge and the dispatch state machine.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum catch-all, body buffering, table snapshot)
//!     → dispatch.rs (match route → load handler → decide)
//!         → handler invocation, or
//!         → page rendering (render subsystem)
//!     → Dispatched → HTTP response + metrics
//! ```

pub mod dispatch;
pub mod server;

pub use dispatch::{dispatch, Dispatched, Outcome};
pub use server::{AppState, HttpServer};
