//! Startup error type
//!
//! Only process startup can fail. Per-request problems are expressed as HTTP
//! statuses by the file-serving layer and never surface here.

use std::net::SocketAddr;

use thiserror::Error;

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration sources could not be read or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// `server.host` / `server.port` do not form a socket address.
    #[error("invalid listen address `{addr}`: {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },

    /// A setting is well-formed but unusable.
    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    /// A `[[cache.rules]]` entry is malformed.
    #[error("invalid cache rule #{index}: {reason}")]
    InvalidCacheRule { index: usize, reason: String },

    /// The embedded bundle contains no files.
    #[error("asset bundle is empty; build the frontend into dist/ before compiling")]
    EmptyBundle,

    /// A bundle entry cannot be addressed relative to the bundle root.
    #[error("asset `{0}` cannot be rooted in the bundle")]
    UnrootedAsset(String),

    /// The tracing subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    Logging(String),

    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
