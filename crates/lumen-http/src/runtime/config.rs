//! # Environment-Based Configuration
//!
//! Server settings loaded from environment variables, overridable through
//! the builder (the CLI applies its flags this way).
//!
//! ## Environment Variables
//!
//! - `LUMEN_PORT` - Listen port (default: 3001)
//! - `LUMEN_REQUEST_TIMEOUT_SECS` - Whole-run timeout for `/chat` in seconds (default: 120)
//! - `LUMEN_MAX_BODY_SIZE` - Maximum request body size in bytes (default: 1048576 / 1MB)
//! - `LUMEN_ENABLE_CORS` - Permissive CORS (default: true)
//! - `LUMEN_MAX_ITERATIONS` - Model calls allowed per chat run (default: 10)
//! - `LUMEN_SITE_CONFIG` - Path to the site configuration JSON
//! - `LUMEN_DASHBOARDS_DIR` - Directory of dashboard manifests
//! - `LUMEN_USAGE_LOG_CAPACITY` - Usage log entries kept in memory (default: 10000)
//! - `LUMEN_CONVERSATION_CAPACITY` - Conversations kept in memory (default: 1000)

use std::fmt::Display;
use std::str::FromStr;
use std::{env, path::PathBuf, time::Duration};

use crate::conversations::DEFAULT_CONVERSATION_CAPACITY;
use crate::usage::DEFAULT_USAGE_CAPACITY;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub port: u16,
    pub request_timeout_secs: u64,
    pub max_body_size: usize,
    pub enable_cors: bool,
    pub max_iterations: usize,
    pub site_config_path: Option<PathBuf>,
    pub dashboards_dir: Option<PathBuf>,
    pub usage_log_capacity: usize,
    pub conversation_capacity: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            request_timeout_secs: 120,
            max_body_size: 1024 * 1024,
            enable_cors: true,
            max_iterations: 10,
            site_config_path: None,
            dashboards_dir: None,
            usage_log_capacity: DEFAULT_USAGE_CAPACITY,
            conversation_capacity: DEFAULT_CONVERSATION_CAPACITY,
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Builder for [`HttpConfig`] with environment variable support
#[derive(Debug, Clone, Default)]
pub struct HttpConfigBuilder {
    config: HttpConfig,
}

impl HttpConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if any variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::default();

        if let Some(port) = get_env_parsed("LUMEN_PORT")? {
            builder = builder.port(port);
        }
        if let Some(timeout) = get_env_parsed("LUMEN_REQUEST_TIMEOUT_SECS")? {
            builder = builder.request_timeout_secs(timeout);
        }
        if let Some(max_size) = get_env_parsed("LUMEN_MAX_BODY_SIZE")? {
            builder = builder.max_body_size(max_size);
        }
        if let Some(cors) = get_env_bool("LUMEN_ENABLE_CORS")? {
            builder = builder.enable_cors(cors);
        }
        if let Some(max_iterations) = get_env_parsed("LUMEN_MAX_ITERATIONS")? {
            builder = builder.max_iterations(max_iterations);
        }
        if let Some(path) = get_env_string("LUMEN_SITE_CONFIG") {
            builder = builder.site_config_path(PathBuf::from(path));
        }
        if let Some(dir) = get_env_string("LUMEN_DASHBOARDS_DIR") {
            builder = builder.dashboards_dir(PathBuf::from(dir));
        }
        if let Some(capacity) = get_env_parsed("LUMEN_USAGE_LOG_CAPACITY")? {
            builder = builder.usage_log_capacity(capacity);
        }
        if let Some(capacity) = get_env_parsed("LUMEN_CONVERSATION_CAPACITY")? {
            builder = builder.conversation_capacity(capacity);
        }

        Ok(builder)
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn request_timeout_secs(mut self, timeout: u64) -> Self {
        self.config.request_timeout_secs = timeout;
        self
    }

    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.config.enable_cors = enable;
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn site_config_path(mut self, path: PathBuf) -> Self {
        self.config.site_config_path = Some(path);
        self
    }

    pub fn dashboards_dir(mut self, dir: PathBuf) -> Self {
        self.config.dashboards_dir = Some(dir);
        self
    }

    pub fn usage_log_capacity(mut self, capacity: usize) -> Self {
        self.config.usage_log_capacity = capacity;
        self
    }

    pub fn conversation_capacity(mut self, capacity: usize) -> Self {
        self.config.conversation_capacity = capacity;
        self
    }

    /// Validate configuration and build [`HttpConfig`]
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the configuration is invalid.
    pub fn build(self) -> Result<HttpConfig, ConfigError> {
        self.validate()?;
        Ok(self.config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let config = &self.config;
        if config.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if config.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be <= 600 (10 minutes)".to_string(),
            ));
        }
        if config.max_body_size == 0 {
            return Err(ConfigError::ValidationError(
                "max_body_size must be greater than 0".to_string(),
            ));
        }
        if config.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if config.usage_log_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "usage_log_capacity must be greater than 0".to_string(),
            ));
        }
        if config.conversation_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "conversation_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

// Environment variable helper functions

fn get_env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn get_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(val) => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!(
                    "invalid boolean value '{val}', expected true/false/1/0/yes/no/on/off"
                ),
            }),
        },
        Err(_) => Ok(None),
    }
}

fn get_env_parsed<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid value '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder() {
        let config = HttpConfigBuilder::new().build().unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.usage_log_capacity, 10_000);
        assert!(config.enable_cors);
    }

    #[test]
    fn test_builder_validation_timeout() {
        let result = HttpConfigBuilder::new().request_timeout_secs(0).build();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("request_timeout_secs must be greater than 0")
        );
    }

    #[test]
    fn test_builder_validation_iterations() {
        let result = HttpConfigBuilder::new().max_iterations(0).build();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("max_iterations must be at least 1")
        );
    }

    #[test]
    fn test_env_parsing_absent() {
        assert_eq!(get_env_bool("LUMEN_NONEXISTENT_FLAG").unwrap(), None);
        assert_eq!(
            get_env_parsed::<u16>("LUMEN_NONEXISTENT_PORT").unwrap(),
            None
        );
    }

    #[test]
    fn test_builder_custom_values() {
        let config = HttpConfigBuilder::new()
            .port(8080)
            .max_body_size(4096)
            .enable_cors(false)
            .dashboards_dir(PathBuf::from("/srv/dashboards"))
            .build()
            .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.max_body_size, 4096);
        assert!(!config.enable_cors);
        assert_eq!(
            config.dashboards_dir.as_deref(),
            Some(std::path::Path::new("/srv/dashboards"))
        );
    }
}
