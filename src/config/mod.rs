// Configuration module entry point
// Loads layered configuration and builds the immutable per-server state

mod args;
mod state;
mod types;

use std::net::{IpAddr, SocketAddr};

use crate::error::ServeError;

// Re-export public types
pub use args::Args;
pub use state::AppState;
pub use types::{Config, LogLevel};

/// Looked up in the working directory when no `--config` is given
const DEFAULT_CONFIG_FILE: &str = "coi-serve";

/// Prefix for environment overrides, e.g. `COI_SERVE_SERVER__PORT=9000`
const ENV_PREFIX: &str = "COI_SERVE";

impl Config {
    /// Load configuration: defaults < config file < environment < command line
    pub fn load(args: &Args) -> Result<Self, config::ConfigError> {
        let file = match args.config.as_deref() {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", args.port.map(i64::from))?
            .set_override_option("server.host", args.host.clone())?
            .set_override_option(
                "server.root",
                args.root
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option(
                "server.workers",
                args.workers.and_then(|w| i64::try_from(w).ok()),
            )?
            .set_override_option("logging.access_log", args.quiet.then_some(false))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServeError> {
        self.server
            .host
            .trim_matches(|c| c == '[' || c == ']')
            .parse::<IpAddr>()
            .map(|ip| SocketAddr::new(ip, self.server.port))
            .map_err(|_| ServeError::InvalidAddress(self.server.host.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.server.root, PathBuf::from("."));
        assert_eq!(cfg.http.index_files, vec!["index.html", "index.htm"]);
        assert!(cfg.http.directory_listing);
        assert!(cfg.http.server_name.starts_with("coi-serve/"));
        assert_eq!(cfg.logging.level, LogLevel::Info);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.performance.keep_alive);
    }

    #[test]
    fn test_load_file_with_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9001
root = "public"

[http]
directory_listing = false

[http.mime_types]
md = "text/markdown"

[logging]
level = "debug"
access_log_format = "json"
"#,
        )
        .unwrap();

        let path_str = path.to_string_lossy().into_owned();
        let args = Args::parse_from(["coi-serve", "--config", &path_str, "--port", "9100", "-q"]);
        let cfg = Config::load(&args).unwrap();

        // CLI wins over the file, file wins over defaults
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.root, PathBuf::from("public"));
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert!(!cfg.http.directory_listing);
        assert_eq!(
            cfg.http.mime_types.get("md").map(String::as_str),
            Some("text/markdown")
        );
        assert_eq!(cfg.logging.level, LogLevel::Debug);
        assert_eq!(cfg.logging.access_log_format, "json");
        assert!(!cfg.logging.access_log);
    }

    #[test]
    fn test_missing_explicit_config_file_is_an_error() {
        let args = Args::parse_from(["coi-serve", "--config", "/definitely/not/here.toml"]);
        assert!(Config::load(&args).is_err());
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::default();
        assert_eq!(
            cfg.socket_addr().unwrap(),
            "0.0.0.0:8000".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "[::1]".to_string();
        cfg.server.port = 8080;
        assert_eq!(
            cfg.socket_addr().unwrap(),
            "[::1]:8080".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "not an address".to_string();
        assert!(matches!(
            cfg.socket_addr(),
            Err(ServeError::InvalidAddress(_))
        ));
    }
}
