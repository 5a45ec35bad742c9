//! HTTP protocol layer module
//!
//! Response construction decoupled from routing and business logic.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_405_response, build_413_response, build_500_response, build_not_found_response,
    build_text_response, NOT_FOUND_BODY,
};
