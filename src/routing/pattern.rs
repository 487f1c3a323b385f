//! Route pattern compilation.
//!
//! # Responsibilities
//! - Compile a route string into an anchored matcher
//! - Collect dynamic segment names in left-to-right order
//!
//! # Design Decisions
//! - A `[name]` segment matches one or more non-`/` characters
//! - Literal segments are regex-escaped, so `.` and friends stay literal
//! - Anchored at both ends: no prefix or suffix extensions match
//! - Compilation is deterministic: same route string, same matcher

use regex::Regex;
use thiserror::Error;

/// Error compiling a route string into a pattern.
#[derive(Debug, Error)]
#[error("invalid route pattern {route:?}: {source}")]
pub struct PatternError {
    /// The offending route string.
    pub route: String,
    /// Underlying regex failure.
    #[source]
    pub source: regex::Error,
}

/// A compiled route pattern.
///
/// Derived once from the canonical route string; matching is a single
/// anchored regex test per request.
///
/// # Example
///
/// ```
/// use pagetree::routing::pattern::PathPattern;
///
/// let pattern = PathPattern::compile("/users/[id]").unwrap();
/// assert!(pattern.is_match("/users/123"));
/// assert!(!pattern.is_match("/users/123/posts"));
/// assert_eq!(pattern.param_names(), ["id"]);
/// ```
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The original route string.
    raw: String,
    /// Anchored matcher compiled from `raw`.
    regex: Regex,
    /// Dynamic segment names, left-to-right.
    param_names: Vec<String>,
}

impl PathPattern {
    /// Compiles a route string.
    ///
    /// Segments wrapped in `[` `]` become wildcards matching one or more
    /// non-`/` characters; everything else matches literally. The empty
    /// route matches only the empty path, and `/` matches only `/`.
    pub fn compile(route: &str) -> Result<Self, PatternError> {
        let mut param_names = Vec::new();

        let pattern = route
            .split('/')
            .map(|seg| {
                if seg.is_empty() {
                    return String::new();
                }
                if seg.starts_with('[') && seg.ends_with(']') {
                    param_names.push(seg[1..seg.len() - 1].to_string());
                    return "[^/]+".to_string();
                }
                regex::escape(seg)
            })
            .collect::<Vec<_>>()
            .join("/");

        let regex = Regex::new(&format!("^{pattern}$")).map_err(|source| PatternError {
            route: route.to_string(),
            source,
        })?;

        Ok(Self {
            raw: route.to_string(),
            regex,
            param_names,
        })
    }

    /// Tests a concrete request path against the compiled matcher.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Returns the original route string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the dynamic segment names in left-to-right order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Returns the compiled regex source, mainly for diagnostics and
    /// structural comparison between table generations.
    pub fn regex_str(&self) -> &str {
        self.regex.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_route_matches_exactly() {
        let pattern = PathPattern::compile("/users").unwrap();
        assert!(pattern.is_match("/users"));
        assert!(!pattern.is_match("/users/"));
        assert!(!pattern.is_match("/posts"));
        assert!(pattern.param_names().is_empty());
    }

    #[test]
    fn test_dynamic_segment_matches_nonempty_slash_free() {
        let pattern = PathPattern::compile("/users/[id]").unwrap();
        assert!(pattern.is_match("/users/123"));
        assert!(pattern.is_match("/users/abc-def"));
        assert!(!pattern.is_match("/users/"));
        assert!(!pattern.is_match("/users"));
        assert!(!pattern.is_match("/users/1/2"));
    }

    #[test]
    fn test_rejects_prefix_and_suffix_extensions() {
        let pattern = PathPattern::compile("/users/[id]/posts").unwrap();
        assert!(pattern.is_match("/users/7/posts"));
        assert!(!pattern.is_match("/users/7"));
        assert!(!pattern.is_match("/users/7/posts/9"));
        assert!(!pattern.is_match("/api/users/7/posts"));
    }

    #[test]
    fn test_literal_segments_are_escaped() {
        let pattern = PathPattern::compile("/v1.0/data").unwrap();
        assert!(pattern.is_match("/v1.0/data"));
        assert!(!pattern.is_match("/v1x0/data"));
    }

    #[test]
    fn test_param_names_in_declaration_order() {
        let pattern = PathPattern::compile("/org/[orgId]/repos/[repoId]/issues/[issueId]").unwrap();
        assert_eq!(pattern.param_names(), ["orgId", "repoId", "issueId"]);
    }

    #[test]
    fn test_root_route_matches_only_root() {
        let pattern = PathPattern::compile("/").unwrap();
        assert!(pattern.is_match("/"));
        assert!(!pattern.is_match(""));
        assert!(!pattern.is_match("/x"));
    }

    #[test]
    fn test_empty_route_matches_only_empty_path() {
        let pattern = PathPattern::compile("").unwrap();
        assert!(pattern.is_match(""));
        assert!(!pattern.is_match("/"));
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let a = PathPattern::compile("/users/[id]/posts").unwrap();
        let b = PathPattern::compile("/users/[id]/posts").unwrap();
        assert_eq!(a.regex_str(), b.regex_str());
        assert_eq!(a.param_names(), b.param_names());
    }
}
