use clap::Parser;
use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;

use crate::config::{AppState, Args, Config};
use crate::error::ServeError;
use crate::server::StaticServer;

fn main() {
    if let Err(e) = run() {
        logger::log_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run() -> Result<(), ServeError> {
    let args = Args::parse();
    let cfg = Config::load(&args)?;
    logger::init(&cfg)?;

    // Create Tokio runtime, sizing the worker pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers.filter(|&w| w > 0) {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), ServeError> {
    let state = Arc::new(AppState::new(cfg)?);
    let server = StaticServer::bind(state)?;

    logger::log_server_start(&server.local_addr()?, server.state());

    server.run().await;
    Ok(())
}
