// Connection handling module
// Serves a single accepted TCP connection on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept a connection and hand it to a spawned task.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state));
}

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 keep-alive from `performance.keep_alive`
/// 3. Limits how long a request head may take to arrive
///    (`performance.read_timeout`, 0 disables it); bodies in flight are
///    not subject to any deadline
/// 4. Serves the connection with the request handler
fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let perf = &state.config.performance;
        let header_timeout = (perf.read_timeout > 0).then_some(Duration::from_secs(perf.read_timeout));

        let mut builder = http1::Builder::new();
        builder
            .keep_alive(perf.keep_alive)
            .timer(TokioTimer::new())
            .header_read_timeout(header_timeout);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                handler::handle_request(req, peer_addr, Arc::clone(&service_state))
            }),
        );

        if let Err(err) = conn.await {
            if err.is_timeout() {
                logger::log_debug(&format!(
                    "Connection from {peer_addr} closed: no request head within {} seconds",
                    state.config.performance.read_timeout
                ));
            } else {
                logger::log_connection_error(&err);
            }
        }
    });
}
