//! Named-parameter extraction.
//!
//! Extraction is positional and deliberately tolerant: it never rejects a
//! length mismatch between path and route, since accepting or refusing a
//! path is the matcher's job. Callers must filter unbound entries before
//! handing the map to handler code.

use std::collections::HashMap;

/// Extracts named parameters from a concrete path using the route string.
///
/// Route segments wrapped in `[` `]` bind the path segment at the same
/// position; a missing path segment binds `None`. Literal segments are
/// ignored here. Leading, trailing, and doubled slashes contribute no
/// segments on either side.
pub fn named_params(path: &str, route: &str) -> HashMap<String, Option<String>> {
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let mut params = HashMap::new();
    for (i, seg) in route.split('/').filter(|s| !s.is_empty()).enumerate() {
        if seg.starts_with('[') && seg.ends_with(']') {
            let name = &seg[1..seg.len() - 1];
            params.insert(
                name.to_string(),
                path_segments.get(i).map(|v| (*v).to_string()),
            );
        }
    }
    params
}

/// Extracts parameters and drops unbound entries.
///
/// This is the map a handler sees: every value present and concrete.
pub fn bound_params(path: &str, route: &str) -> HashMap<String, String> {
    named_params(path, route)
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn test_extracts_single_parameter() {
        let params = named_params("/users/123", "/users/[id]");
        assert_eq!(params.len(), 1);
        assert_eq!(params["id"], some("123"));
    }

    #[test]
    fn test_extracts_multiple_parameters() {
        let params = named_params(
            "/org/abc/repos/xyz/issues/999",
            "/org/[orgId]/repos/[repoId]/issues/[issueId]",
        );
        assert_eq!(params["orgId"], some("abc"));
        assert_eq!(params["repoId"], some("xyz"));
        assert_eq!(params["issueId"], some("999"));
    }

    #[test]
    fn test_mixed_static_and_dynamic_segments() {
        let params = named_params("/api/v1/users/789/profile", "/api/v1/users/[userId]/profile");
        assert_eq!(params.len(), 1);
        assert_eq!(params["userId"], some("789"));
    }

    #[test]
    fn test_short_path_binds_none() {
        let params = named_params("/users", "/users/[id]/posts/[postId]");
        assert_eq!(params["id"], None);
        assert_eq!(params["postId"], None);
    }

    #[test]
    fn test_long_path_extra_segments_ignored() {
        let params = named_params("/users/123/extra", "/users/[id]");
        assert_eq!(params.len(), 1);
        assert_eq!(params["id"], some("123"));
    }

    #[test]
    fn test_no_parameters_in_route() {
        assert!(named_params("/static/path", "/static/path").is_empty());
    }

    #[test]
    fn test_empty_path_and_route() {
        assert!(named_params("", "").is_empty());
    }

    #[test]
    fn test_root_level_parameter() {
        let params = named_params("/123", "/[id]");
        assert_eq!(params["id"], some("123"));
    }

    #[test]
    fn test_trailing_slashes_are_ignored() {
        let params = named_params("/users/123/", "/users/[id]/");
        assert_eq!(params["id"], some("123"));
    }

    #[test]
    fn test_bound_params_drops_unbound() {
        let params = bound_params("/users", "/users/[id]/posts/[postId]");
        assert!(params.is_empty());

        let params = bound_params("/users/7/posts", "/users/[id]/posts/[postId]");
        assert_eq!(params.len(), 1);
        assert_eq!(params["id"], "7");
    }
}
