// Server module entry point
// Listener binding and per-connection serving

pub mod connection;
pub mod listener;

// Re-export commonly used entry points
pub use connection::accept_connection;
pub use listener::bind_listener;
