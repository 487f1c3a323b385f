//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Walk the application directory tree and compile one [`Route`] per
//!   routable directory (one holding a handler file and/or `page.html`)
//! - Cache page text, layout chains, and the document shell eagerly
//! - Serve first-match-wins lookups over the compiled routes
//!
//! # Design Decisions
//! - Traversal is preorder with lexicographically sorted children, so table
//!   order, and therefore match precedence, is deterministic across rebuilds
//!   and platforms.
//! - Per-route problems (an unreadable file, a pattern that fails to
//!   compile) skip that route with a warning instead of failing the build.
//!   Only an unusable tree root aborts.
//! - The table is immutable after build. Reloads construct a complete new
//!   table and publish it wholesale; in-flight requests keep whatever
//!   snapshot they already loaded.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::handler::loader;
use crate::render::layout;
use crate::routing::pattern::PathPattern;
use crate::routing::route::Route;

/// File name of a page template inside a route directory.
pub const PAGE_FILE: &str = "page.html";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("route tree root {root:?} is not readable: {source}")]
    RootUnreadable {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("route tree root {root:?} is not a directory")]
    RootNotADirectory { root: PathBuf },
}

/// An immutable generation of compiled routes.
pub struct RouteTable {
    routes: Vec<Route>,
    document: Option<String>,
    generation: u64,
}

impl RouteTable {
    /// Compiles the directory tree under `root` into a route table.
    ///
    /// `route_file` is the handler file name to look for in each directory
    /// (`route.rhai` unless configured otherwise).
    pub fn build(root: &Path, route_file: &str, generation: u64) -> Result<Self, BuildError> {
        let metadata = fs::metadata(root).map_err(|source| BuildError::RootUnreadable {
            root: root.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(BuildError::RootNotADirectory {
                root: root.to_path_buf(),
            });
        }

        let mut routes = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable tree entry");
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            if let Some(route) = compile_route(root, entry.path(), route_file) {
                routes.push(route);
            }
        }

        let document = layout::document_root(root);
        tracing::info!(
            generation,
            routes = routes.len(),
            document = document.is_some(),
            "Route table built"
        );
        Ok(Self {
            routes,
            document,
            generation,
        })
    }

    /// Returns the first route whose pattern matches `path`.
    pub fn match_path(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.pattern.is_match(path))
    }

    /// Routes in match-precedence order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Document shell text at the tree root, if one exists.
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Compiles one directory into a route, or `None` when it is not routable
/// or its pattern cannot be compiled.
fn compile_route(root: &Path, dir: &Path, route_file: &str) -> Option<Route> {
    let handler_path = dir.join(route_file);
    let page_path = dir.join(PAGE_FILE);
    let handler_exists = handler_path.is_file();
    let page_exists = page_path.is_file();
    if !handler_exists && !page_exists {
        return None;
    }

    let path = route_string(root, dir);
    let pattern = match PathPattern::compile(&path) {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::warn!(route = %path, error = %e, "Skipping route with uncompilable pattern");
            return None;
        }
    };

    // Routability is decided by file existence; a file that then fails to
    // read degrades to an absent page or handler.
    let page = if page_exists { read_logged(&page_path) } else { None };
    let handler_source = if handler_exists {
        read_logged(&handler_path)
    } else {
        None
    };
    let fingerprint = handler_source.as_deref().map(loader::fingerprint);
    let layouts = layout::ordered_layouts(root, &path);

    tracing::debug!(
        route = %path,
        has_page = page.is_some(),
        has_handler = handler_source.is_some(),
        layouts = layouts.len(),
        "Route compiled"
    );
    Some(Route {
        path,
        pattern,
        page,
        handler_source,
        fingerprint,
        source_path: handler_path,
        layouts,
    })
}

fn read_logged(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(file = ?path, error = %e, "Failed to read route file");
            None
        }
    }
}

/// Derives the canonical route string for a directory: `/` for the root,
/// otherwise `/`-joined path components relative to the root.
fn route_string(root: &Path, dir: &Path) -> String {
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    let mut out = String::new();
    for component in rel.components() {
        out.push('/');
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTE_FILE: &str = "route.rhai";

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn build(root: &Path) -> RouteTable {
        RouteTable::build(root, ROUTE_FILE, 0).unwrap()
    }

    #[test]
    fn test_root_directory_is_routable() {
        let tree = tempfile::tempdir().unwrap();
        write(tree.path(), "route.rhai", "fn GET(request, ctx) { 1 }");

        let table = build(tree.path());
        assert_eq!(table.len(), 1);
        assert_eq!(table.routes()[0].path, "/");
        assert!(table.match_path("/").is_some());
        assert!(table.match_path("/other").is_none());
    }

    #[test]
    fn test_route_strings_mirror_directories() {
        let tree = tempfile::tempdir().unwrap();
        write(tree.path(), "users/page.html", "<p>list</p>");
        write(tree.path(), "users/[id]/route.rhai", "fn GET(request, ctx) { 1 }");

        let table = build(tree.path());
        let paths: Vec<&str> = table.routes().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["/users", "/users/[id]"]);
    }

    #[test]
    fn test_directories_without_route_files_are_transparent() {
        let tree = tempfile::tempdir().unwrap();
        write(tree.path(), "a/b/c/page.html", "<p>deep</p>");

        let table = build(tree.path());
        assert_eq!(table.len(), 1);
        assert_eq!(table.routes()[0].path, "/a/b/c");
        assert!(table.match_path("/a/b/c").is_some());
        assert!(table.match_path("/a/b").is_none());
    }

    #[test]
    fn test_page_text_and_layouts_cached_at_build() {
        let tree = tempfile::tempdir().unwrap();
        write(tree.path(), "layout.html", "<root>{{content}}</root>");
        write(tree.path(), "blog/layout.html", "<blog>{{content}}</blog>");
        write(tree.path(), "blog/page.html", "<p>post</p>");
        write(tree.path(), "document.html", "<doc>{{content}}</doc>");

        let table = build(tree.path());
        let route = table.match_path("/blog").unwrap();
        assert_eq!(route.page.as_deref(), Some("<p>post</p>"));
        assert_eq!(
            route.layouts,
            ["<root>{{content}}</root>", "<blog>{{content}}</blog>"]
        );
        assert_eq!(table.document(), Some("<doc>{{content}}</doc>"));
    }

    #[test]
    fn test_handler_source_and_fingerprint_cached() {
        let tree = tempfile::tempdir().unwrap();
        let source = "fn GET(request, ctx) { 1 }";
        write(tree.path(), "api/route.rhai", source);

        let table = build(tree.path());
        let route = table.match_path("/api").unwrap();
        assert_eq!(route.handler_source.as_deref(), Some(source));
        assert_eq!(route.fingerprint, Some(loader::fingerprint(source)));
        assert!(route.page.is_none());
    }

    #[test]
    fn test_first_match_wins_in_traversal_order() {
        let tree = tempfile::tempdir().unwrap();
        write(tree.path(), "[slug]/route.rhai", "fn GET(request, ctx) { \"wild\" }");
        write(tree.path(), "users/route.rhai", "fn GET(request, ctx) { \"exact\" }");

        let table = build(tree.path());
        // Children sort lexicographically and '[' < 'u', so the wildcard
        // directory is compiled first and shadows the literal one.
        let paths: Vec<&str> = table.routes().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["/[slug]", "/users"]);
        assert_eq!(table.match_path("/users").unwrap().path, "/[slug]");
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let tree = tempfile::tempdir().unwrap();
        write(tree.path(), "b/page.html", "b");
        write(tree.path(), "a/route.rhai", "fn GET(request, ctx) { 1 }");
        write(tree.path(), "a/[x]/page.html", "x");

        let first = build(tree.path());
        let second = build(tree.path());
        assert_eq!(first.len(), second.len());
        for (left, right) in first.routes().iter().zip(second.routes()) {
            assert_eq!(left.path, right.path);
            assert_eq!(left.pattern.regex_str(), right.pattern.regex_str());
            assert_eq!(left.page, right.page);
            assert_eq!(left.fingerprint, right.fingerprint);
            assert_eq!(left.layouts, right.layouts);
        }
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let tree = tempfile::tempdir().unwrap();
        let missing = tree.path().join("nope");
        assert!(matches!(
            RouteTable::build(&missing, ROUTE_FILE, 0),
            Err(BuildError::RootUnreadable { .. })
        ));
    }

    #[test]
    fn test_file_root_is_an_error() {
        let tree = tempfile::tempdir().unwrap();
        let file = tree.path().join("root.txt");
        fs::write(&file, "not a dir").unwrap();
        assert!(matches!(
            RouteTable::build(&file, ROUTE_FILE, 0),
            Err(BuildError::RootNotADirectory { .. })
        ));
    }

    #[test]
    fn test_generation_is_carried() {
        let tree = tempfile::tempdir().unwrap();
        write(tree.path(), "page.html", "<p>hi</p>");
        let table = RouteTable::build(tree.path(), ROUTE_FILE, 7).unwrap();
        assert_eq!(table.generation(), 7);
    }

    #[test]
    fn test_custom_route_file_name() {
        let tree = tempfile::tempdir().unwrap();
        write(tree.path(), "api/handler.rhai", "fn GET(request, ctx) { 1 }");
        write(tree.path(), "api/route.rhai", "ignored by this build");

        let table = RouteTable::build(tree.path(), "handler.rhai", 0).unwrap();
        let route = table.match_path("/api").unwrap();
        assert_eq!(
            route.handler_source.as_deref(),
            Some("fn GET(request, ctx) { 1 }")
        );
    }
}
