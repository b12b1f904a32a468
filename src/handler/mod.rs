//! Request handler module
//!
//! Method validation, route dispatch and the HTTP adapter of the directory
//! endpoint.

pub mod dir_endpoint;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
