//! HTTP protocol layer module
//!
//! Response builders and URI helpers, independent of what the endpoints serve.

pub mod response;
pub mod uri;

// Re-export commonly used types
pub use response::{
    build_404_response, build_405_response, build_error_response, build_health_response,
    build_options_response, build_text_response,
};
