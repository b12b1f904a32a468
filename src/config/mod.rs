// Configuration module entry point
// Loads layered configuration and holds the per-process application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, DirConfig};

/// Default config file name (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable prefix, e.g. `DIRVIEW__DIR__BASE_DIR=/srv`
pub const ENV_PREFIX: &str = "DIRVIEW";

impl Config {
    /// Load configuration from the path given as first CLI argument,
    /// falling back to `config.*` in the working directory
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (extension optional).
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let invalid = |msg: String| Err(config::ConfigError::Message(msg));

        if !self.dir.base_dir.starts_with('/') {
            return invalid(format!(
                "dir.base_dir must be an absolute path, got '{}'",
                self.dir.base_dir
            ));
        }
        let prefix = &self.dir.route_prefix;
        if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
            return invalid(format!(
                "dir.route_prefix must look like '/dir' (leading '/', no trailing '/'), got '{prefix}'"
            ));
        }
        if self.health.enabled
            && [&self.health.liveness_path, &self.health.readiness_path]
                .iter()
                .any(|p| p.as_str() == prefix.as_str() || p.starts_with(&format!("{prefix}/")))
        {
            return invalid(format!("health paths must not live under '{prefix}'"));
        }
        if self.server.workers == Some(0) {
            return invalid("server.workers must be at least 1".to_string());
        }
        if crate::logger::Level::parse(&self.logging.level).is_none() {
            return invalid(format!(
                "logging.level must be one of error, warn, info, debug; got '{}'",
                self.logging.level
            ));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
