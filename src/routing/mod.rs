//! Routing module
//!
//! Provides the statically declared routing layer:
//! - URL path normalization (separator collapsing, context-path stripping)
//! - The controller registry populated once at startup
//! - The immutable route table consulted on every request

pub mod path;
pub mod registry;
pub mod table;

pub use registry::{registry_key, Controller, Registry};
pub use table::{Handler, HandlerError, HandlerResult, RouteSet, RouteTable};
