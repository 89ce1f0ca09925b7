//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! Configuration is loaded once at startup and carried in the application state.

use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_MAX_GROUP_SIZE, DEFAULT_MIN_GROUP_SIZE,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub grouping: GroupingConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub log_format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Backing store selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process-local store, for demos and local development only
    Memory,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: Option<String>,
    pub max_connections: u32,
}

/// Automatic grouping defaults, used when a request omits its own bounds
#[derive(Debug, Clone)]
pub struct GroupingConfig {
    pub max_group_size: usize,
    pub min_group_size: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            max_group_size: DEFAULT_MAX_GROUP_SIZE,
            min_group_size: DEFAULT_MIN_GROUP_SIZE,
        }
    }
}

impl Default for Config {
    /// Local defaults on the in-memory store
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                rust_log: "contestdesk=info,tower_http=info".to_string(),
                log_format: LogFormat::Pretty,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                url: None,
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            },
            grouping: GroupingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            grouping: GroupingConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") | Err(_) => LogFormat::Pretty,
            Ok(_) => return Err(ConfigError::InvalidValue("LOG_FORMAT".to_string())),
        };

        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_or("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "contestdesk=info,tower_http=info".to_string()),
            log_format,
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let backend = match env::var("STORAGE").as_deref() {
            Ok("memory") => StorageBackend::Memory,
            Ok("postgres") | Err(_) => StorageBackend::Postgres,
            Ok(_) => return Err(ConfigError::InvalidValue("STORAGE".to_string())),
        };

        let url = env::var("DATABASE_URL").ok();
        if backend == StorageBackend::Postgres && url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL".to_string()));
        }

        Ok(Self {
            backend,
            url,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS)?,
        })
    }
}

impl GroupingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            max_group_size: parse_or("DEFAULT_MAX_GROUP_SIZE", DEFAULT_MAX_GROUP_SIZE)?,
            min_group_size: parse_or("DEFAULT_MIN_GROUP_SIZE", DEFAULT_MIN_GROUP_SIZE)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the bounds are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_group_size == 0 {
            return Err(ConfigError::InvalidValue("DEFAULT_MAX_GROUP_SIZE".to_string()));
        }
        if self.min_group_size > self.max_group_size {
            return Err(ConfigError::InvalidValue("DEFAULT_MIN_GROUP_SIZE".to_string()));
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let server = ServerConfig {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            rust_log: "info".to_string(),
            log_format: LogFormat::Pretty,
        };
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);

        let grouping = GroupingConfig::default();
        assert_eq!(grouping.max_group_size, 20);
        assert_eq!(grouping.min_group_size, 8);
        assert!(grouping.validate().is_ok());
    }

    #[test]
    fn test_grouping_bounds_rejected() {
        let inverted = GroupingConfig {
            max_group_size: 5,
            min_group_size: 6,
        };
        assert!(inverted.validate().is_err());

        let empty = GroupingConfig {
            max_group_size: 0,
            min_group_size: 0,
        };
        assert!(empty.validate().is_err());
    }
}
