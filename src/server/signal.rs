// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use crate::logger;

/// Resolve once the process is asked to stop.
///
/// If the Unix handlers cannot be registered, falls back to Ctrl+C only.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                logger::log_warning(&format!("Failed to register signal handlers: {e}"));
                ctrl_c().await;
                return;
            }
        };

    tokio::select! {
        _ = sigterm.recv() => logger::log_debug("SIGTERM received"),
        _ = sigint.recv() => logger::log_debug("SIGINT received"),
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        // Without any signal source, run until killed
        std::future::pending::<()>().await;
    }
}
