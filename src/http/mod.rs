//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! asset store and the request pipeline.

pub mod cache;
pub mod mime;
pub mod path;
pub mod range;
pub mod response;
pub mod writer;

// Re-export commonly used types
pub use range::parse_range_header;
pub use writer::{BufferedResponse, ResponseWriter};
