//! Process entry point
//!
//! Startup is strictly ordered: load config, install the logger, register
//! controllers, build the immutable route table, bind the listener, and only
//! then start accepting connections. The route table therefore exists in
//! full before the first request can arrive.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod config;
mod controllers;
mod handler;
mod http;
mod logger;
mod routing;
mod server;

use config::AppState;
use routing::RouteTable;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    // Registration and table construction run to completion before the
    // listener is bound; there is no window where a request can observe a
    // partially built table.
    let registry = controllers::register_all();
    let routes = Arc::new(RouteTable::build(&registry));

    let addr = cfg.get_socket_addr()?;
    let listener = server::bind_listener(addr)?;

    let state = Arc::new(AppState::new(cfg, routes));
    let active_connections = Arc::new(AtomicUsize::new(0));

    logger::log_server_start(&addr, &state);

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                server::accept_connection(stream, peer_addr, &state, &active_connections);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}
