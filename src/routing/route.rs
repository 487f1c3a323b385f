//! One directory-scoped unit of dispatch.

use std::path::PathBuf;

use crate::routing::pattern::PathPattern;

/// A routable directory, compiled for dispatch.
///
/// Built once per table generation and immutable afterwards. Everything a
/// request needs later (page text, layout chain, handler source) is
/// captured at build time, so steady-state dispatch never touches the
/// filesystem. Request-scoped facts (the HTTP method in particular) are
/// never stored here; they travel through the dispatch pipeline as
/// parameters.
#[derive(Debug, Clone)]
pub struct Route {
    /// Canonical route string, e.g. `/users/[id]`.
    pub path: String,
    /// Compiled matcher derived from `path`.
    pub pattern: PathPattern,
    /// Page template text, when the directory has one.
    pub page: Option<String>,
    /// Raw handler source text, when the directory has one.
    pub handler_source: Option<String>,
    /// Content fingerprint of `handler_source`; the handler cache key.
    pub fingerprint: Option<u64>,
    /// Handler file path, for diagnostics.
    pub source_path: PathBuf,
    /// Layout fragment texts on the directory chain, root-most first.
    pub layouts: Vec<String>,
}

impl Route {
    /// Whether a page template exists for this route.
    pub fn has_page(&self) -> bool {
        self.page.is_some()
    }

    /// Dynamic segment names of the route, left-to-right.
    pub fn param_names(&self) -> &[String] {
        self.pattern.param_names()
    }
}
