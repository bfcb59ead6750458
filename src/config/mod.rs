// Configuration module entry point
// Loads layered configuration: defaults, config file, environment, CLI overrides

mod types;

use std::net::SocketAddr;

use crate::error::StartupError;

// Re-export public types
pub use types::{
    CacheConfig, CachePolicyKind, CacheRuleConfig, Config, LogFormat, LoggingConfig,
    PerformanceConfig, ServerConfig, StaticFilesConfig,
};

/// Environment variable prefix, e.g. `COI_SERVE_SERVER__PORT=80`
pub const ENV_PREFIX: &str = "COI_SERVE";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// A missing file is not an error; defaults and environment still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.reuse_port", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "structured")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("cache.policy", "extension")?
            .set_default("static_files.index_files", vec!["index.html"])?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Reject values that would only fail once the server is running
    pub fn validate(&self) -> Result<(), StartupError> {
        if self.server.workers == Some(0) {
            return Err(StartupError::InvalidSetting {
                key: "server.workers",
                reason: "must be at least 1".to_string(),
            });
        }
        for name in &self.static_files.index_files {
            if name.is_empty() || name.contains('/') {
                return Err(StartupError::InvalidSetting {
                    key: "static_files.index_files",
                    reason: format!("`{name}` is not a file name"),
                });
            }
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| StartupError::InvalidAddress { addr, source })
    }

    /// Connection-wide timeout, the larger of read and write timeouts
    pub fn connection_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(std::cmp::max(
            self.performance.read_timeout,
            self.performance.write_timeout,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/coi-serve").unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert!(!cfg.server.reuse_port);
        assert_eq!(cfg.cache.policy, CachePolicyKind::Extension);
        assert!(cfg.cache.rules.is_empty());
        assert_eq!(cfg.static_files.index_files, vec!["index.html".to_string()]);
        assert_eq!(cfg.logging.format, LogFormat::Text);
        assert_eq!(cfg.logging.access_log_format, "structured");
        assert!(cfg.logging.access_log);
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::load_from("does-not-exist/coi-serve").unwrap();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 80;
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 80);

        cfg.server.host = "not an address".to_string();
        assert!(matches!(
            cfg.get_socket_addr(),
            Err(StartupError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_validate() {
        let mut cfg = Config::load_from("does-not-exist/coi-serve").unwrap();
        assert!(cfg.validate().is_ok());

        cfg.server.workers = Some(0);
        assert!(matches!(
            cfg.validate(),
            Err(StartupError::InvalidSetting { key: "server.workers", .. })
        ));
        cfg.server.workers = Some(2);
        assert!(cfg.validate().is_ok());

        for bad in ["", "docs/index.html", "/index.html"] {
            cfg.static_files.index_files = vec!["index.html".to_string(), bad.to_string()];
            assert!(
                matches!(
                    cfg.validate(),
                    Err(StartupError::InvalidSetting { key: "static_files.index_files", .. })
                ),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_connection_timeout() {
        let mut cfg = Config::load_from("does-not-exist/coi-serve").unwrap();
        cfg.performance.read_timeout = 5;
        cfg.performance.write_timeout = 12;
        assert_eq!(cfg.connection_timeout().as_secs(), 12);
    }
}
