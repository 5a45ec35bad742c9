//! URL path normalization
//!
//! Route keys and request paths go through the same normalization so that
//! registration and lookup always agree: repeated separators are collapsed
//! and every path starts with a single `/`.

/// Collapse runs of `/` into one and ensure a leading `/`.
///
/// An empty input normalizes to `/`.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    out.push('/');
    let mut prev_sep = true;
    for c in path.chars() {
        if c == '/' {
            if !prev_sep {
                out.push('/');
            }
            prev_sep = true;
        } else {
            out.push(c);
            prev_sep = false;
        }
    }
    out
}

/// Join a controller base path and a route fragment into a full route key.
///
/// The two fragments are concatenated with a `/` between them and the result
/// is normalized, so redundant separators on either side collapse:
/// `join("/a", "/b")`, `join("/a/", "b")` and `join("a", "b")` all yield
/// `/a/b`.
pub fn join(base: &str, fragment: &str) -> String {
    normalize(&format!("{base}/{fragment}"))
}

/// Strip the deployment-root prefix from a request path, then normalize.
///
/// The prefix is removed once, from the front only, and only at a segment
/// boundary: `/app` matches `/app` and `/app/hello` but not `/apphello`.
/// A path outside the context is left as-is (minus normalization); a
/// request for the context root maps to `/`.
pub fn strip_context_path(path: &str, context_path: &str) -> String {
    if context_path.is_empty() || context_path == "/" {
        return normalize(path);
    }
    match path.strip_prefix(context_path) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => normalize(rest),
        _ => normalize(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_separators() {
        assert_eq!(normalize("//a///b"), "/a/b");
        assert_eq!(normalize("/a/b"), "/a/b");
        assert_eq!(normalize("a/b"), "/a/b");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("///"), "/");
    }

    #[test]
    fn test_normalize_keeps_trailing_separator() {
        assert_eq!(normalize("/a/b/"), "/a/b/");
        assert_eq!(normalize("/a//b//"), "/a/b/");
    }

    #[test]
    fn test_join_base_and_fragment() {
        assert_eq!(join("/a", "/b"), "/a/b");
        assert_eq!(join("/a/", "/b"), "/a/b");
        assert_eq!(join("/a", "b"), "/a/b");
        assert_eq!(join("", "hello"), "/hello");
        assert_eq!(join("/", "hello"), "/hello");
    }

    #[test]
    fn test_strip_context_path() {
        assert_eq!(strip_context_path("/app/hello", "/app"), "/hello");
        assert_eq!(strip_context_path("/app", "/app"), "/");
        assert_eq!(strip_context_path("/hello", "/app"), "/hello");
    }

    #[test]
    fn test_strip_context_path_empty_context() {
        assert_eq!(strip_context_path("/hello", ""), "/hello");
        assert_eq!(strip_context_path("//hello", "/"), "/hello");
    }

    #[test]
    fn test_strip_context_path_requires_segment_boundary() {
        assert_eq!(strip_context_path("/apphello", "/app"), "/apphello");
        assert_eq!(strip_context_path("/application/x", "/app"), "/application/x");
    }

    #[test]
    fn test_strip_context_path_only_once() {
        // The prefix is removed from the front only, not from the middle.
        assert_eq!(strip_context_path("/app/app/hello", "/app"), "/app/hello");
    }
}
