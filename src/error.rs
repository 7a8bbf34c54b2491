//! Startup error types
//!
//! Request-level failures never surface here: they are answered with
//! 404/500 responses by the handler. Everything in [`ServeError`] stops the
//! server before (or while) it accepts connections.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServeError {
    /// Listening socket could not be bound (port in use, missing privilege)
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// `server.host` is not an IP address
    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),

    /// Serving root is missing or not a directory
    #[error("Serving root '{}' is not usable: {source}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
