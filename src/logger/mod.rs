//! Logger module
//!
//! Logging utilities for the dispatcher:
//! - Server lifecycle and route registration logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support
//!
//! Until `init` runs, everything falls back to stdout/stderr, so route
//! registration performed before logger setup still produces output.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{AppState, Config};
use crate::routing::HandlerError;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, state: &AppState) {
    let config = &state.config;
    write_info("======================================");
    write_info("Dispatcher initialized, server started");
    write_info(&format!("Listening on: http://{addr}"));
    if !config.routing.context_path.is_empty() {
        write_info(&format!("Context path: {}", config.routing.context_path));
    }
    write_info(&format!("Registered routes: {}", state.routes.len()));
    for key in state.routes.keys() {
        write_info(&format!("  - {key}"));
    }
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_route_registered(key: &str, controller: &str) {
    write_info(&format!("[Route] {key} -> {controller}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log a failed handler invocation; the client only receives a generic 500
pub fn log_handler_error(path: &str, controller: &str, err: &HandlerError) {
    write_error(&format!(
        "[ERROR] Handler {controller} failed for {path}: {err}"
    ));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
