//! Request context and parameter binding
//!
//! Wraps the pieces of an inbound request that handlers are allowed to see:
//! the method, the normalized path, and the request parameter map assembled
//! from the query string and an url-encoded form body. Handlers bind
//! parameters explicitly by name through the accessors here instead of
//! relying on positional or type-based inference.

use crate::routing::path;
use hyper::Method;

/// Parsed view of a single request, handed to the matched handler.
pub struct RequestContext {
    method: Method,
    raw_path: String,
    normalized_path: String,
    query: Option<String>,
    /// Query-string pairs first, then form-body pairs, both in arrival order.
    params: Vec<(String, String)>,
}

impl RequestContext {
    /// Assemble a context from the request line pieces.
    ///
    /// `context_path` is the deployment-root prefix to strip before route
    /// lookup. `form_body` is the raw body of an
    /// `application/x-www-form-urlencoded` POST, if any.
    #[must_use]
    pub fn new(
        method: Method,
        raw_path: &str,
        query: Option<&str>,
        form_body: Option<&[u8]>,
        context_path: &str,
    ) -> Self {
        let mut params = Vec::new();
        if let Some(query) = query {
            parse_pairs(query.as_bytes(), &mut params);
        }
        if let Some(body) = form_body {
            parse_pairs(body, &mut params);
        }

        Self {
            method,
            raw_path: raw_path.to_string(),
            normalized_path: path::strip_context_path(raw_path, context_path),
            query: query.map(ToString::to_string),
            params,
        }
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// The path as received on the wire.
    #[must_use]
    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    /// The normalized path used as the route lookup key.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.normalized_path
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// First value bound to `name`, if the parameter was sent.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First value bound to `name`, or `default` when absent.
    #[must_use]
    pub fn param_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.param(name).unwrap_or(default)
    }

    /// All values bound to `name`, in arrival order.
    #[must_use]
    pub fn params(&self, name: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// All values bound to `name` joined with `, `, if the parameter was
    /// sent at all.
    #[must_use]
    pub fn joined_param(&self, name: &str) -> Option<String> {
        let values = self.params(name);
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    /// Number of parameter pairs received.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// Decode `key=value&key=value` pairs into the parameter list.
fn parse_pairs(input: &[u8], params: &mut Vec<(String, String)>) {
    for (key, value) in form_urlencoded::parse(input) {
        params.push((key.into_owned(), value.into_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_context(path: &str, query: Option<&str>) -> RequestContext {
        RequestContext::new(Method::GET, path, query, None, "")
    }

    #[test]
    fn test_query_parameters() {
        let ctx = get_context("/hello", Some("name=world&greeting=hi"));
        assert_eq!(ctx.param("name"), Some("world"));
        assert_eq!(ctx.param("greeting"), Some("hi"));
        assert_eq!(ctx.param("missing"), None);
        assert_eq!(ctx.param_count(), 2);
    }

    #[test]
    fn test_param_or_default() {
        let ctx = get_context("/hello", None);
        assert_eq!(ctx.param_or("name", ""), "");
        assert_eq!(ctx.param_or("name", "guest"), "guest");
    }

    #[test]
    fn test_multi_value_first_and_joined() {
        let ctx = get_context("/hello", Some("tag=a&tag=b&tag=c"));
        assert_eq!(ctx.param("tag"), Some("a"));
        assert_eq!(ctx.params("tag"), vec!["a", "b", "c"]);
        assert_eq!(ctx.joined_param("tag"), Some("a, b, c".to_string()));
        assert_eq!(ctx.joined_param("missing"), None);
    }

    #[test]
    fn test_percent_decoding() {
        let ctx = get_context("/hello", Some("name=hello%20world&sym=%26"));
        assert_eq!(ctx.param("name"), Some("hello world"));
        assert_eq!(ctx.param("sym"), Some("&"));
    }

    #[test]
    fn test_form_body_parameters() {
        let ctx = RequestContext::new(
            Method::POST,
            "/submit",
            Some("source=query"),
            Some(b"name=form&source=body"),
            "",
        );
        // Query pairs come first, form pairs after.
        assert_eq!(ctx.param("name"), Some("form"));
        assert_eq!(ctx.param("source"), Some("query"));
        assert_eq!(ctx.params("source"), vec!["query", "body"]);
    }

    #[test]
    fn test_context_path_stripping() {
        let ctx = RequestContext::new(Method::GET, "/app/hello", None, None, "/app");
        assert_eq!(ctx.raw_path(), "/app/hello");
        assert_eq!(ctx.path(), "/hello");
    }

    #[test]
    fn test_separator_collapsing() {
        let ctx = get_context("//hello///there", None);
        assert_eq!(ctx.path(), "/hello/there");
    }
}
