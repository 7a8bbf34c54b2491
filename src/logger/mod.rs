//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error, warning and debug logging filtered by `logging.level`

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{AppState, Config, LogLevel};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Active verbosity; `Info` until `init()` says otherwise
static LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    LEVEL.store(config.logging.level as u8, Ordering::Relaxed);
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn enabled(level: LogLevel) -> bool {
    level as u8 <= LEVEL.load(Ordering::Relaxed)
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, state: &AppState) {
    let config = &state.config;
    write_info("======================================");
    write_info(&format!(
        "Serving at http://localhost:{} with COOP/COEP headers...",
        addr.port()
    ));
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Serving root: {}", state.root.display()));
    write_info("  Cross-Origin-Opener-Policy: same-origin");
    write_info("  Cross-Origin-Embedder-Policy: require-corp");
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_shutdown() {
    write_info("[Shutdown] Signal received, closing listener");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    if enabled(LogLevel::Warn) {
        write_error(&format!("[WARN] Failed to serve connection: {err:?}"));
    }
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    if enabled(LogLevel::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_debug(message: &str) {
    if enabled(LogLevel::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
