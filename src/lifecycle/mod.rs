//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Build initial route table → Spawn reloader → Serve
//!
//! Shutdown (shutdown.rs):
//!     CTRL+C → server drains connections → trigger() → reloader exits
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
