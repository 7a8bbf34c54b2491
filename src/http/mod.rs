//! HTTP protocol layer module
//!
//! Response builders, the MIME table and the isolation header decorator,
//! kept free of filesystem and routing concerns.

pub mod isolation;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_404_response, build_405_response, build_500_response, build_html_response,
    build_redirect_response, ResponseBody,
};
