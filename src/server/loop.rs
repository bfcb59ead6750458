// Server loop module
// Accepts connections until shutdown, then drains the in-flight ones

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;

use super::connection::{serve_connection, ConnectionSettings};
use crate::logger::{self, AccessSink};
use crate::pipeline::{FileServer, Pipeline};

/// Accept loop
///
/// Spawns one task per connection. When `shutdown` resolves the listener is
/// dropped, every open connection is told to finish its current request and
/// close, and the function returns once all of them are gone.
pub async fn serve<S, L, F>(
    listener: TcpListener,
    pipeline: Arc<Pipeline<S, L>>,
    settings: ConnectionSettings,
    shutdown: F,
) where
    S: FileServer,
    L: AccessSink,
    F: Future<Output = ()>,
{
    let mut tasks = JoinSet::new();
    let (drain_tx, drain_rx) = watch::channel(false);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            // Checked first so a signal stops accepting even under load
            biased;

            () = &mut shutdown => {
                logger::log_shutdown(tasks.len());
                break;
            }

            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr)) => {
                    logger::log_connection_accepted(&peer_addr);
                    tasks.spawn(serve_connection(
                        stream,
                        peer_addr,
                        Arc::clone(&pipeline),
                        settings,
                        drain_rx.clone(),
                    ));
                }
                Err(e) => logger::log_accept_error(&e),
            },

            // Reap finished connection tasks so the set does not grow without bound
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    drop(listener);
    let _ = drain_tx.send(true);
    while tasks.join_next().await.is_some() {}

    logger::log_server_stopped();
}
