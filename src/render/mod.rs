//! Page rendering: layout discovery and template composition.
//!
//! # Data Flow
//!
//! ```text
//! table build:  route dir ──> layout::ordered_layouts ──> cached on Route
//!               tree root ──> layout::document_root   ──> cached on RouteTable
//!
//! dispatch:     page + layouts + document ──> compose::compose ──> html
//!               handler JSON body ──> compose::substitute ──> final html
//! ```

pub mod compose;
pub mod layout;
