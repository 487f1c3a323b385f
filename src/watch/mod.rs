//! Dev-mode reloading.
//!
//! # Data Flow
//! ```text
//! file change ──> notify (recursive watch)
//!             ──> debounce window (collapse editor bursts)
//!             ──> RouteTable::build (new generation)
//!             ──> ArcSwap::store (readers pick it up on next load)
//! ```

pub mod reloader;

pub use reloader::DevReloader;
