//! Routing subsystem: from directory tree to matched route.
//!
//! # Data Flow
//! ```text
//! Table build (startup and dev reloads):
//!     app directory tree
//!     → table.rs (preorder walk, sorted children)
//!     → pattern.rs (route string → anchored regex)
//!     → Freeze as immutable RouteTable
//!
//! Per request:
//!     request path
//!     → RouteTable::match_path (first match wins, table order)
//!     → params.rs (segment-position parameter binding)
//!     → Matched Route + bound parameters, or no match
//! ```
//!
//! # Design Decisions
//! - Routes are compiled at build time and immutable afterwards; a reload
//!   publishes a whole new table
//! - Deterministic: traversal order fixes match precedence, so the same
//!   tree always dispatches the same way
//! - Matching is method-agnostic; the HTTP method only matters later, when
//!   the dispatcher decides between handler and page

pub mod params;
pub mod pattern;
pub mod route;
pub mod table;

pub use route::Route;
pub use table::{BuildError, RouteTable};
