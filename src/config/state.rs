//! Shared application state
//!
//! Everything the request path needs, created once at startup: the loaded
//! configuration and the immutable route table. The state is held behind an
//! `Arc` by every connection task and never mutated, so the request path is
//! lock-free.

use crate::config::Config;
use crate::routing::RouteTable;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub routes: Arc<RouteTable>,
}

impl AppState {
    #[must_use]
    pub const fn new(config: Config, routes: Arc<RouteTable>) -> Self {
        Self { config, routes }
    }
}
