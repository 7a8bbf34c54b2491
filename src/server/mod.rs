// Server module entry point
// Binds the listener and runs the accept loop until shutdown

pub mod connection;
pub mod listener;
pub mod signal;

// Rust does not allow `loop` as a module name (keyword), so use server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::error::ServeError;

// Re-export commonly used items
pub use listener::create_listener;
pub use server_loop::start_server_loop;
pub use signal::shutdown_signal;

/// A bound, not yet running, static file server
pub struct StaticServer {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl StaticServer {
    /// Bind the configured `host:port`.
    ///
    /// Fails with [`ServeError::Bind`] when the port is taken or needs
    /// privileges the process lacks.
    pub fn bind(state: Arc<AppState>) -> Result<Self, ServeError> {
        let addr = state.config.socket_addr()?;
        let listener =
            create_listener(addr).map_err(|source| ServeError::Bind { addr, source })?;
        Ok(Self { listener, state })
    }

    /// Actual bound address; differs from the configured one when port 0 was asked for
    pub fn local_addr(&self) -> Result<SocketAddr, ServeError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Serve until SIGINT/SIGTERM (Ctrl+C on Windows)
    pub async fn run(self) {
        self.run_until(shutdown_signal()).await;
    }

    /// Serve until `shutdown` resolves
    pub async fn run_until<S>(self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        start_server_loop(self.listener, self.state, shutdown).await;
    }
}
