//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, body limits,
//! parameter parsing, route table lookup, and handler invocation. The route
//! table is built before the listener starts accepting, so by the time this
//! code runs the dispatcher is always in its ready state.

pub mod context;

pub use context::RequestContext;

use crate::config::AppState;
use crate::http::response;
use crate::logger;
use crate::logger::AccessLogEntry;
use crate::routing::table::RouteTable;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_TYPE, SERVER};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let http_version = version_label(req.version());
    let raw_path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(&method) {
        return Ok(finish(
            resp, &state, peer_addr, &method, &raw_path, query, http_version, started,
        ));
    }

    // 2. Check declared body size
    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return Ok(finish(
            resp, &state, peer_addr, &method, &raw_path, query, http_version, started,
        ));
    }

    // 3. Read the form body for POST requests, capped at max_body_size
    let form_body = match read_form_body(req, state.config.http.max_body_size).await {
        Ok(body) => body,
        Err(resp) => {
            return Ok(finish(
                resp, &state, peer_addr, &method, &raw_path, query, http_version, started,
            ));
        }
    };

    // 4. Build the request context and dispatch against the route table
    let ctx = RequestContext::new(
        method.clone(),
        &raw_path,
        query.as_deref(),
        form_body.as_deref(),
        &state.config.routing.context_path,
    );
    let resp = dispatch(&ctx, &state.routes);

    Ok(finish(
        resp, &state, peer_addr, &method, &raw_path, query, http_version, started,
    ))
}

/// Resolve the normalized path and invoke the matching handler.
///
/// An empty route table behaves like any other lookup miss: every path
/// resolves to the not-found response. Handler failures are logged and
/// surfaced as a generic 500 with no detail in the body.
pub fn dispatch(ctx: &RequestContext, routes: &RouteTable) -> Response<Full<Bytes>> {
    let Some(entry) = routes.lookup(ctx.path()) else {
        return response::build_not_found_response();
    };

    match (entry.handler)(ctx) {
        Ok(resp) => resp,
        Err(err) => {
            logger::log_handler_error(ctx.path(), entry.controller, &err);
            response::build_500_response()
        }
    }
}

/// Check HTTP method and return a 405 for anything but GET/POST
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::POST => None,
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(response::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(response::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Collect the body of an url-encoded form POST.
///
/// Returns `Ok(None)` for requests without a form body. An oversized or
/// unreadable body maps to an error response for the caller to return.
async fn read_form_body<B>(
    req: Request<B>,
    max_body_size: u64,
) -> Result<Option<Bytes>, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    if req.method() != Method::POST {
        return Ok(None);
    }
    let is_form = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));
    if !is_form {
        return Ok(None);
    }

    // Content-Length was already checked; this guards chunked bodies too.
    if req.body().size_hint().lower() > max_body_size {
        return Err(response::build_413_response());
    }

    match req.into_body().collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            if bytes.len() as u64 > max_body_size {
                logger::log_error(&format!(
                    "Form body exceeded limit after read: {} bytes",
                    bytes.len()
                ));
                return Err(response::build_413_response());
            }
            Ok(Some(bytes))
        }
        Err(err) => {
            logger::log_error(&format!("Failed to read request body: {err}"));
            Err(response::build_500_response())
        }
    }
}

/// Stamp configured headers and emit the access log entry.
#[allow(clippy::too_many_arguments)]
fn finish(
    mut resp: Response<Full<Bytes>>,
    state: &Arc<AppState>,
    peer_addr: SocketAddr,
    method: &Method,
    raw_path: &str,
    query: Option<String>,
    http_version: &'static str,
    started: Instant,
) -> Response<Full<Bytes>> {
    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        resp.headers_mut().insert(SERVER, value);
    }
    if !resp.headers().contains_key(CONTENT_TYPE) {
        if let Ok(value) = HeaderValue::from_str(&state.config.http.default_content_type) {
            resp.headers_mut().insert(CONTENT_TYPE, value);
        }
    }

    if state.config.logging.access_log {
        let body_bytes =
            usize::try_from(resp.body().size_hint().exact().unwrap_or(0)).unwrap_or(usize::MAX);
        let mut entry =
            AccessLogEntry::new(peer_addr.to_string(), method.to_string(), raw_path.to_string());
        entry.query = query;
        entry.http_version = http_version;
        entry.status = resp.status().as_u16();
        entry.body_bytes = body_bytes;
        entry.request_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    resp
}

fn version_label(version: Version) -> &'static str {
    if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::NOT_FOUND_BODY;
    use crate::routing::registry::{Controller, Registry};
    use crate::routing::table::RouteSet;
    use crate::routing::HandlerError;

    struct EchoController;

    impl Controller for EchoController {
        fn name(&self) -> &'static str {
            "EchoController"
        }

        fn base_path(&self) -> &'static str {
            "/echo"
        }

        fn routes(&self, set: &mut RouteSet) {
            set.route("name", |ctx| {
                Ok(response::build_text_response(ctx.param_or("name", "")))
            });
            set.route("fail", |_ctx| {
                Err(HandlerError::new("synthetic failure"))
            });
        }
    }

    fn test_table() -> RouteTable {
        let mut registry = Registry::new();
        registry.register(Arc::new(EchoController));
        RouteTable::build(&registry)
    }

    fn get_context(path: &str, query: Option<&str>) -> RequestContext {
        RequestContext::new(Method::GET, path, query, None, "")
    }

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp
            .into_body()
            .collect()
            .await
            .expect("Full body is infallible")
            .to_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[tokio::test]
    async fn test_dispatch_matched_route() {
        let table = test_table();
        let ctx = get_context("/echo/name", Some("name=world"));
        let resp = dispatch(&ctx, &table);
        assert_eq!(resp.status(), 200);
        assert_eq!(body_string(resp).await, "world");
    }

    #[tokio::test]
    async fn test_dispatch_unmatched_route() {
        let table = test_table();
        let ctx = get_context("/nope", None);
        let resp = dispatch(&ctx, &table);
        assert_eq!(resp.status(), 404);
        assert_eq!(body_string(resp).await, NOT_FOUND_BODY);
    }

    #[test]
    fn test_dispatch_empty_table() {
        let table = RouteTable::default();
        let ctx = get_context("/echo/name", None);
        let resp = dispatch(&ctx, &table);
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_dispatch_handler_error_hides_detail() {
        let table = test_table();
        let ctx = get_context("/echo/fail", None);
        let resp = dispatch(&ctx, &table);
        assert_eq!(resp.status(), 500);
        let body = body_string(resp).await;
        assert!(!body.contains("synthetic failure"));
    }

    #[test]
    fn test_dispatch_collapses_request_separators() {
        let table = test_table();
        let ctx = get_context("//echo//name", Some("name=x"));
        let resp = dispatch(&ctx, &table);
        assert_eq!(resp.status(), 200);
    }

    fn form_request(body: &'static str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::POST)
            .uri("/echo/name")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from(body)))
            .expect("request builds")
    }

    #[test]
    fn test_check_body_size_rejects_over_limit() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/echo/name")
            .header("content-length", "2048")
            .body(Full::new(Bytes::new()))
            .expect("request builds");
        let resp = check_body_size(&req, 1024).expect("413 expected");
        assert_eq!(resp.status(), 413);
        assert!(check_body_size(&req, 4096).is_none());
    }

    #[tokio::test]
    async fn test_read_form_body_rejects_over_limit() {
        let resp = read_form_body(form_request("name=0123456789"), 4)
            .await
            .expect_err("413 expected");
        assert_eq!(resp.status(), 413);
    }

    #[tokio::test]
    async fn test_read_form_body_skips_non_form_posts() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/echo/name")
            .body(Full::new(Bytes::from("name=raw")))
            .expect("request builds");
        let body = read_form_body(req, 1024).await.expect("no form body read");
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_form_body_parameters_reach_handler() {
        let table = test_table();
        let form_body = read_form_body(form_request("name=form-value"), 1024)
            .await
            .expect("body within limit");
        let ctx = RequestContext::new(Method::POST, "/echo/name", None, form_body.as_deref(), "");
        let resp = dispatch(&ctx, &table);
        assert_eq!(resp.status(), 200);
        assert_eq!(body_string(resp).await, "form-value");
    }

    #[test]
    fn test_check_http_method() {
        assert!(check_http_method(&Method::GET).is_none());
        assert!(check_http_method(&Method::POST).is_none());
        let resp = check_http_method(&Method::DELETE).expect("405 expected");
        assert_eq!(resp.status(), 405);
    }
}
