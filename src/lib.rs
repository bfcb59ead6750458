//! Static bundle server with cross-origin isolation
//!
//! Serves a frontend build embedded at compile time from `dist/`. Every
//! response carries `Cross-Origin-Embedder-Policy: require-corp` and
//! `Cross-Origin-Opener-Policy: same-origin`, which browsers require before
//! they enable `SharedArrayBuffer` for threaded WebAssembly. A configurable
//! policy decides `Cache-Control` per path, and one access log record is
//! emitted per request.
//!
//! The moving parts, leaves first:
//! - [`assets`]: the immutable, path-addressable bundle
//! - [`http`]: protocol helpers and the [`http::ResponseWriter`] capability
//! - [`handler`]: the static file server
//! - [`pipeline`]: cache policy, isolation headers, response capture and composition
//! - [`logger`]: subscriber setup and access log sinks
//! - [`server`]: listener, accept loop and graceful shutdown

pub mod assets;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod pipeline;
pub mod server;

pub use error::StartupError;
pub use pipeline::Pipeline;
