//! Request handler module
//!
//! Static file service composed from small capabilities: path resolution,
//! file reading, MIME lookup and response writing, with header injection
//! layered on top in the router.

mod listing;
pub mod resolve;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
