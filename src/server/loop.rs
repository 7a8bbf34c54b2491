// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop.
///
/// A failed `accept()` (e.g. descriptor exhaustion) is logged and the loop
/// keeps going; only `shutdown` ends it. Connections already spawned are
/// not waited for.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop<S>(listener: TcpListener, state: Arc<AppState>, shutdown: S)
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = &mut shutdown => {
                logger::log_shutdown();
                break;
            }
        }
    }
}
