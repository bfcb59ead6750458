// Server module entry point
// Binds the listener and runs the accept loop until a shutdown signal

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the file is mounted under another name
#[path = "loop.rs"]
pub mod server_loop;

use std::sync::Arc;

use crate::config::Config;
use crate::error::StartupError;
use crate::logger;
use crate::pipeline::Pipeline;

pub use connection::ConnectionSettings;
pub use listener::create_listener;
pub use server_loop::serve;

/// Bind the configured address and serve until SIGTERM/SIGINT
///
/// Returns after every in-flight connection has been drained.
pub async fn run(config: &Config, pipeline: Arc<Pipeline>) -> Result<(), StartupError> {
    let addr = config.get_socket_addr()?;
    let listener = create_listener(addr, config.server.reuse_port)
        .map_err(|source| StartupError::Bind { addr, source })?;

    let tree = pipeline.server().tree();
    logger::log_server_start(&listener.local_addr()?, config, tree.len(), tree.total_bytes());

    serve(
        listener,
        pipeline,
        ConnectionSettings::from_config(config),
        signal::shutdown_signal(),
    )
    .await;

    Ok(())
}
