// Listener module
// Creates the TCP listener the accept loop runs on

use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Pending connections the kernel queues before `accept()`
const BACKLOG: i32 = 128;

/// Create a non-blocking `TcpListener` bound to `addr`.
///
/// `SO_REUSEADDR` is set on Unix so a restart does not trip over sockets in
/// `TIME_WAIT`. `SO_REUSEPORT` is never set: a second server on the same
/// port must fail to bind instead of sharing the traffic.
///
/// # Arguments
///
/// * `addr` - The socket address to bind to
pub fn create_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // On Windows SO_REUSEADDR lets two sockets bind the same port
    #[cfg(unix)]
    socket.set_reuse_address(true)?;

    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
