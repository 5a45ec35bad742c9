//! Route table
//!
//! Maps normalized URL paths to typed handler functions. The table is built
//! exactly once at startup from the controller registry and is immutable
//! afterwards; the server loop holds it behind an `Arc` and only ever reads
//! it, so no locking is involved on the request path.

use crate::handler::context::RequestContext;
use crate::logger;
use crate::routing::path;
use crate::routing::registry::Registry;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Error returned by a handler invocation.
///
/// Carries a diagnostic message for the error log; the client only ever
/// sees a generic 500 body.
#[derive(Debug)]
pub struct HandlerError(String);

impl HandlerError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for HandlerError {}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

/// Result type produced by every handler.
pub type HandlerResult = Result<Response<Full<Bytes>>, HandlerError>;

/// A typed request handler.
///
/// Handlers receive the parsed request context and produce a full response.
/// Request parameters are bound explicitly through the context's accessors
/// rather than inferred from parameter types.
pub type Handler = Arc<dyn Fn(&RequestContext) -> HandlerResult + Send + Sync>;

/// Route fragments declared by a single controller.
///
/// Passed to `Controller::routes` during table construction; fragments are
/// joined with the controller's base path to form the final route keys.
#[derive(Default)]
pub struct RouteSet {
    entries: Vec<(String, Handler)>,
}

impl RouteSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a route fragment handled by the given function.
    pub fn route(
        &mut self,
        fragment: &str,
        handler: impl Fn(&RequestContext) -> HandlerResult + Send + Sync + 'static,
    ) {
        self.entries.push((fragment.to_string(), Arc::new(handler)));
    }
}

/// A single route table entry: the owning controller's name plus the
/// handler to invoke.
#[derive(Clone)]
pub struct RouteEntry {
    pub controller: &'static str,
    pub handler: Handler,
}

/// Immutable mapping from normalized route key to handler.
#[derive(Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteEntry>,
}

impl RouteTable {
    /// Build the table from all registered controllers.
    ///
    /// Every route key is `join(base_path, fragment)` with redundant
    /// separators collapsed. A key registered twice keeps the later
    /// handler (last write wins); the overwrite is logged as a warning.
    /// Registration runs fully before the listener accepts connections.
    #[must_use]
    pub fn build(registry: &Registry) -> Self {
        let mut table = Self::default();
        for controller in registry.iter() {
            let mut set = RouteSet::new();
            controller.routes(&mut set);
            for (fragment, handler) in set.entries {
                let key = path::join(controller.base_path(), &fragment);
                table.insert(key, controller.name(), handler);
            }
        }
        table
    }

    fn insert(&mut self, key: String, controller: &'static str, handler: Handler) {
        let entry = RouteEntry {
            controller,
            handler,
        };
        if let Some(previous) = self.routes.insert(key.clone(), entry) {
            logger::log_warning(&format!(
                "Route '{key}' of {controller} overwrites earlier registration by {}",
                previous.controller
            ));
        } else {
            logger::log_route_registered(&key, controller);
        }
    }

    /// Look up the handler for a normalized path.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&RouteEntry> {
        self.routes.get(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route keys in unspecified order, for the startup banner.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response;
    use crate::routing::registry::Controller;

    struct GreetController;

    impl Controller for GreetController {
        fn name(&self) -> &'static str {
            "GreetController"
        }

        fn base_path(&self) -> &'static str {
            "/a"
        }

        fn routes(&self, set: &mut RouteSet) {
            set.route("/b", |_ctx| Ok(response::build_text_response("b")));
            set.route("c", |_ctx| Ok(response::build_text_response("c")));
        }
    }

    struct ShadowController;

    impl Controller for ShadowController {
        fn name(&self) -> &'static str {
            "ShadowController"
        }

        fn base_path(&self) -> &'static str {
            "/a/"
        }

        fn routes(&self, set: &mut RouteSet) {
            set.route("/b", |_ctx| Ok(response::build_text_response("shadow")));
        }
    }

    fn build_table(controllers: Vec<Arc<dyn Controller>>) -> RouteTable {
        let mut registry = Registry::new();
        for controller in controllers {
            registry.register(controller);
        }
        RouteTable::build(&registry)
    }

    #[test]
    fn test_build_joins_base_and_fragment() {
        let table = build_table(vec![Arc::new(GreetController)]);
        assert_eq!(table.len(), 2);
        assert!(table.lookup("/a/b").is_some());
        assert!(table.lookup("/a/c").is_some());
        assert!(table.lookup("/b").is_none());
    }

    #[test]
    fn test_empty_registry_yields_empty_table() {
        let table = build_table(vec![]);
        assert!(table.is_empty());
        assert!(table.lookup("/anything").is_none());
    }

    #[test]
    fn test_duplicate_key_last_write_wins() {
        // Both controllers normalize to /a/b; the later registration wins.
        let table = build_table(vec![Arc::new(GreetController), Arc::new(ShadowController)]);
        let entry = table.lookup("/a/b").expect("route should exist");
        assert_eq!(entry.controller, "ShadowController");
    }
}
