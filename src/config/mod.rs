//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Prefix for environment overrides, e.g. `SERVING_CONSOLE__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "SERVING_CONSOLE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to load config: {0}")]
    LoadError(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// One upstream HTTP endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL, without the API path
    #[serde(default = "default_serving_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_serving_url() -> String {
    "http://127.0.0.1:8182".to_string()
}

fn default_monitor_url() -> String {
    "http://127.0.0.1:32826".to_string()
}

fn default_pilot_url() -> String {
    "http://127.0.0.1:8183".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl EndpointConfig {
    fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            timeout_seconds: default_timeout(),
        }
    }

    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{section} timeout must be greater than 0"
            )));
        }
        Url::parse(&self.base_url).map_err(|e| {
            ConfigError::ValidationError(format!(
                "{section} base_url '{}' is invalid: {e}",
                self.base_url
            ))
        })?;
        Ok(())
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self::with_base_url(default_serving_url())
    }
}

fn default_monitor() -> EndpointConfig {
    EndpointConfig::with_base_url(default_monitor_url())
}

fn default_pilot() -> EndpointConfig {
    EndpointConfig::with_base_url(default_pilot_url())
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Serving-management API
    #[serde(default)]
    pub serving: EndpointConfig,

    /// Prometheus-compatible metrics API
    #[serde(default = "default_monitor")]
    pub monitor: EndpointConfig,

    /// Autoscaler API
    #[serde(default = "default_pilot")]
    pub pilot: EndpointConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            serving: EndpointConfig::default(),
            monitor: default_monitor(),
            pilot: default_pilot(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = ::config::Config::builder()
            .add_source(::config::File::from(path.to_path_buf()).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.serving.validate("serving")?;
        self.monitor.validate("monitor")?;
        self.pilot.validate("pilot")?;

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
