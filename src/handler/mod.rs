//! Request handler module
//!
//! Extracts the per-request context and serves files from the asset tree.

pub mod context;
pub mod static_files;

pub use context::RequestContext;
pub use static_files::StaticFiles;
