//! Greeting controller
//!
//! The illustrative endpoint: `GET /hello?name=world` answers with the
//! plain-text body `hello, world`.

use crate::http::response;
use crate::routing::registry::Controller;
use crate::routing::table::{HandlerResult, RouteSet};

pub struct HelloController;

impl Controller for HelloController {
    fn name(&self) -> &'static str {
        "HelloController"
    }

    fn routes(&self, set: &mut RouteSet) {
        set.route("hello", Self::hello);
    }
}

impl HelloController {
    /// Write a greeting for the `name` parameter. A request without the
    /// parameter greets nobody rather than failing.
    fn hello(ctx: &crate::handler::RequestContext) -> HandlerResult {
        let name = ctx.param_or("name", "");
        Ok(response::build_text_response(format!("hello, {name}")))
    }
}
