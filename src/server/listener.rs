// Listener module
// Creates the TCP listener with socket options the accept loop relies on

use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Pending-connection queue length passed to `listen(2)`
pub const BACKLOG: i32 = 1024;

/// Create a `TcpListener` with `SO_REUSEADDR` and, optionally, `SO_REUSEPORT`.
///
/// `SO_REUSEADDR` allows rebinding a port whose previous sockets are still in
/// `TIME_WAIT`. `SO_REUSEPORT` lets several processes share the port, with
/// the kernel spreading connections across them.
///
/// Must be called from within a tokio runtime.
pub fn create_listener(addr: SocketAddr, reuse_port: bool) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    if reuse_port {
        set_reuse_port(&socket)?;
    }

    // Non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

#[cfg(unix)]
fn set_reuse_port(socket: &Socket) -> std::io::Result<()> {
    socket.set_reuse_port(true)
}

#[cfg(not(unix))]
fn set_reuse_port(_socket: &Socket) -> std::io::Result<()> {
    tracing::warn!("SO_REUSEPORT is not supported on this platform, ignoring server.reuse_port");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_binds_ephemeral_port() {
        let listener = create_listener("127.0.0.1:0".parse().unwrap(), false).unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reuse_port_allows_second_bind() {
        let first = create_listener("127.0.0.1:0".parse().unwrap(), true).unwrap();
        let addr = first.local_addr().unwrap();
        let second = create_listener(addr, true).unwrap();
        assert_eq!(second.local_addr().unwrap(), addr);
    }
}
