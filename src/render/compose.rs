//! Template composition and placeholder substitution.
//!
//! # Responsibilities
//! - Wrap page content in its layout chain, innermost layout first
//! - Apply the document shell as the final, outermost wrap
//! - Substitute `{{key}}` placeholders from handler-provided JSON data
//!
//! # Design Decisions
//! - Composition is pure string work over text cached at table build time.
//!   No filesystem access happens here, so rendering cannot fail.
//! - Each layout wrap replaces a single `{{content}}` token. A layout that
//!   omits the token swallows the inner content, which is treated as the
//!   author's intent rather than an error.
//! - Placeholder substitution replaces every occurrence of `{{key}}`, not
//!   just the first, and only top-level JSON scalars participate. Nested
//!   objects and arrays are skipped.

use serde_json::Value;

/// Token a layout or document must contain to receive inner content.
pub const CONTENT_TOKEN: &str = "{{content}}";

/// Fallback document shell used when the route tree has no `document.html`.
pub const DEFAULT_DOCUMENT: &str = "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\"><title>pagetree</title></head><body>{{content}}</body></html>";

/// Composes the final page text from cached fragments.
///
/// `layouts` is ordered from the tree root down to the route directory.
/// Wrapping starts at the leaf-most layout and works outward, so the root
/// layout ends up closest to the document shell. The document (or the
/// built-in default) is always applied last.
pub fn compose(page: &str, layouts: &[String], document: Option<&str>) -> String {
    let mut content = page.to_string();
    for layout in layouts.iter().rev() {
        content = layout.replacen(CONTENT_TOKEN, &content, 1);
    }
    document
        .unwrap_or(DEFAULT_DOCUMENT)
        .replacen(CONTENT_TOKEN, &content, 1)
}

/// Replaces `{{key}}` placeholders in `content` with top-level scalar
/// values from `data`.
///
/// Strings substitute their raw text, numbers and booleans their JSON
/// rendering, and `null` the literal `null`. Every occurrence of a
/// placeholder is replaced. Non-object `data` leaves the content untouched.
pub fn substitute(content: &str, data: &Value) -> String {
    let Some(fields) = data.as_object() else {
        return content.to_string();
    };
    let mut out = content.to_string();
    for (key, value) in fields {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::Object(_) | Value::Array(_) => continue,
        };
        out = out.replace(&format!("{{{{{key}}}}}"), &text);
    }
    out
}
