//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Subscriber installation (text or JSON on stderr)
//! - Server lifecycle logging
//! - Access logging with multiple formats

mod format;
mod sink;

pub use format::{AccessLogEntry, AccessLogFormat};
pub use sink::{AccessSink, MemorySink, TracingSink};

use std::net::SocketAddr;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{Config, LogFormat, LoggingConfig};
use crate::error::StartupError;

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `logging.level`. Should be called once at
/// application startup; the subscriber lives until the process exits.
pub fn init(config: &LoggingConfig) -> Result<(), StartupError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(&config.level),
    }
    .map_err(|e| StartupError::Logging(format!("invalid log filter: {e}")))?;

    let layer = match config.format {
        LogFormat::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| StartupError::Logging(e.to_string()))
}

/// Access sink described by `[logging]`; `None` when access logging is off
pub fn access_sink(config: &LoggingConfig) -> Option<TracingSink> {
    config
        .access_log
        .then(|| TracingSink::new(AccessLogFormat::from(config.access_log_format.as_str())))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, assets: usize, bytes: usize) {
    tracing::info!(
        %addr,
        cache_policy = ?config.cache.policy,
        access_log = config.logging.access_log,
        access_log_format = %config.logging.access_log_format,
        "server started"
    );
    tracing::info!(assets, bytes, "asset bundle loaded");
    if let Some(workers) = config.server.workers {
        tracing::info!(workers, "worker threads");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::trace!(%peer_addr, "connection accepted");
}

pub fn log_connection_error(peer_addr: &SocketAddr, err: &impl std::fmt::Display) {
    tracing::debug!(%peer_addr, error = %err, "failed to serve connection");
}

pub fn log_connection_timeout(peer_addr: &SocketAddr) {
    tracing::debug!(%peer_addr, "connection timed out");
}

pub fn log_accept_error(err: &std::io::Error) {
    tracing::error!(error = %err, "failed to accept connection");
}

pub fn log_shutdown(in_flight: usize) {
    tracing::info!(in_flight, "shutdown signal received, draining connections");
}

pub fn log_server_stopped() {
    tracing::info!("server stopped");
}
