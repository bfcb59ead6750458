// Connection handling module
// Serves one accepted TCP connection through the request pipeline

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;
use tokio::sync::watch;

use crate::config::Config;
use crate::handler::RequestContext;
use crate::logger::{self, AccessSink};
use crate::pipeline::{FileServer, Pipeline};

/// Per-connection HTTP settings derived from `[performance]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub keep_alive: bool,
    /// Upper bound for receiving a complete request head
    pub header_read_timeout: Duration,
    /// Upper bound for the whole connection
    pub connection_timeout: Duration,
}

impl ConnectionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            keep_alive: config.performance.keep_alive_timeout > 0,
            header_read_timeout: Duration::from_secs(config.performance.read_timeout),
            connection_timeout: config.connection_timeout(),
        }
    }
}

/// Serve a single connection until it closes, times out, or shutdown drains it.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 connection settings (keep-alive, header timeout)
/// 3. Serves every request on the connection through the pipeline
/// 4. On shutdown, lets the in-flight request finish and then closes
/// 5. Applies the connection-wide timeout
pub async fn serve_connection<S, L>(
    stream: TcpStream,
    peer_addr: SocketAddr,
    pipeline: Arc<Pipeline<S, L>>,
    settings: ConnectionSettings,
    mut shutdown: watch::Receiver<bool>,
) where
    S: FileServer,
    L: AccessSink,
{
    let io = TokioIo::new(stream);

    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .keep_alive(settings.keep_alive)
        .header_read_timeout(settings.header_read_timeout);

    let service = service_fn(move |req: Request<Incoming>| {
        let pipeline = Arc::clone(&pipeline);
        let ctx = RequestContext::from_request(&req, Some(peer_addr));
        async move { Ok::<_, Infallible>(pipeline.respond(ctx).await) }
    });

    let conn = builder.serve_connection(io, service);
    tokio::pin!(conn);

    let served = tokio::time::timeout(settings.connection_timeout, async {
        tokio::select! {
            result = conn.as_mut() => result,
            _ = shutdown.changed() => {
                conn.as_mut().graceful_shutdown();
                conn.as_mut().await
            }
        }
    })
    .await;

    match served {
        Ok(Ok(())) => {}
        Ok(Err(err)) => logger::log_connection_error(&peer_addr, &err),
        Err(_) => logger::log_connection_timeout(&peer_addr),
    }
}
