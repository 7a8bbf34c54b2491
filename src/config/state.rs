// Application state module
// Immutable per-server state shared by every connection task

use std::io;
use std::path::PathBuf;

use super::types::Config;
use crate::error::ServeError;
use crate::http::mime::MimeTable;

/// Application state
///
/// Built once before the listener is bound and never written afterwards, so
/// connection tasks share it through an `Arc` without locking.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Canonical serving root; every resolved path must stay under it
    pub root: PathBuf,
    pub mime: MimeTable,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ServeError> {
        let configured = config.server.root.clone();
        let root = configured.canonicalize().map_err(|source| ServeError::Root {
            path: configured.clone(),
            source,
        })?;
        if !root.is_dir() {
            return Err(ServeError::Root {
                path: configured,
                source: io::Error::other("not a directory"),
            });
        }

        let mime = MimeTable::with_overrides(&config.http.mime_types);

        Ok(Self { config, root, mime })
    }
}
