// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub cache: CacheConfig,
    pub static_files: StaticFilesConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Set `SO_REUSEPORT` on the listening socket
    #[serde(default)]
    pub reuse_port: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Output format of the stderr subscriber
    #[serde(default)]
    pub format: LogFormat,
    /// Emit one access record per request
    pub access_log: bool,
    /// Access log format (structured, combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "structured".to_string()
}

/// Subscriber output format
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
}

/// Cache-Control policy selection
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub policy: CachePolicyKind,
    /// Ordered rules, only consulted when `policy = "custom"`
    #[serde(default)]
    pub rules: Vec<CacheRuleConfig>,
}

/// Which deployment policy decides `Cache-Control`
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CachePolicyKind {
    /// `.wasm` short-lived, content-hashed bundle outputs immutable
    Extension,
    /// Everything under `/assets` immutable
    Prefix,
    /// Never set `Cache-Control`
    None,
    /// Use `cache.rules`
    Custom,
}

/// A single configured cache rule
///
/// Exactly one of `extensions` or `prefix` must be set.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CacheRuleConfig {
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub prefix: Option<String>,
    pub directive: String,
}

/// Static file serving configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StaticFilesConfig {
    pub index_files: Vec<String>,
}
