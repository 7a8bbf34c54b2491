// Command line arguments
// Flags here take precedence over the config file and environment

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[clap(version, about)]
pub struct Args {
    /// Config file path (extension optional); defaults to ./coi-serve.toml if present
    #[clap(short, long)]
    pub config: Option<String>,
    /// Port to listen on
    #[clap(short, long)]
    pub port: Option<u16>,
    /// Address to bind, e.g. 0.0.0.0 or ::1
    #[clap(long)]
    pub host: Option<String>,
    /// Directory to serve
    #[clap(short, long)]
    pub root: Option<PathBuf>,
    /// Number of runtime worker threads
    #[clap(short, long)]
    pub workers: Option<usize>,
    /// Disable the access log
    #[clap(short, long)]
    pub quiet: bool,
}
