//! Layout and document fragment discovery.
//!
//! # Responsibilities
//! - Collect the chain of `layout.html` fragments that applies to a route,
//!   walking from the tree root down to the route's own directory
//! - Read the optional `document.html` shell at the tree root
//!
//! # Design Decisions
//! - Discovery happens once per table build. Fragment text is cached on the
//!   route, so requests never touch the filesystem.
//! - A directory without a layout file simply contributes nothing. Missing
//!   layouts are normal control flow, not errors.

use std::fs;
use std::path::Path;

/// File name of a per-directory layout fragment.
pub const LAYOUT_FILE: &str = "layout.html";

/// File name of the document shell, honored only at the tree root.
pub const DOCUMENT_FILE: &str = "document.html";

/// Returns the layout fragments applying to `route`, ordered root-first.
///
/// The tree root itself participates: a `layout.html` directly under `root`
/// wraps every page in the tree. `route` is the canonical route string
/// (`"/"`, `"/users/[id]"`, ...), whose segments mirror directory names.
pub fn ordered_layouts(root: &Path, route: &str) -> Vec<String> {
    let mut layouts = Vec::new();
    let mut dir = root.to_path_buf();
    if let Some(text) = read_fragment(&dir) {
        layouts.push(text);
    }
    for segment in route.split('/').filter(|s| !s.is_empty()) {
        dir.push(segment);
        if let Some(text) = read_fragment(&dir) {
            layouts.push(text);
        }
    }
    layouts
}

/// Reads the document shell at the tree root, if present.
pub fn document_root(root: &Path) -> Option<String> {
    fs::read_to_string(root.join(DOCUMENT_FILE)).ok()
}

fn read_fragment(dir: &Path) -> Option<String> {
    match fs::read_to_string(dir.join(LAYOUT_FILE)) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(directory = ?dir, error = %e, "Failed to read layout fragment");
            None
        }
    }
}
