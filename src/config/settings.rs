//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub pagination: PaginationConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
///
/// A `url` of `memory` selects the in-process store instead of Postgres.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// Bearer token verification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: Option<String>,
    pub token_ttl_seconds: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the daily-rolling log file; stdout only when unset
    pub directory: Option<String>,
    pub json: bool,
}

/// Page sizes for paginated listings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationConfig {
    pub page_size: u32,
    pub max_page_size: u32,
}

impl DatabaseConfig {
    /// Whether the in-memory store was requested
    pub fn is_memory(&self) -> bool {
        self.url.eq_ignore_ascii_case("memory")
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Settings {
    /// Load settings from defaults, an optional `config` file and
    /// `EGATE_`-prefixed environment variables (`EGATE_DATABASE__URL`).
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("EGATE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::EgateError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/egate".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                issuer: None,
                token_ttl_seconds: 3600,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: None,
                json: false,
            },
            pagination: PaginationConfig {
                page_size: 20,
                max_page_size: 100,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.pagination.page_size, 20);
        assert_eq!(settings.server.bind_address(), "0.0.0.0:8000");
        assert!(!settings.database.is_memory());
    }

    #[test]
    fn test_memory_url() {
        let mut settings = Settings::default();
        settings.database.url = "MEMORY".to_string();
        assert!(settings.database.is_memory());
    }
}
