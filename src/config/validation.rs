//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{EgateError, Result};

const MIN_SECRET_LENGTH: usize = 32;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_logging_config(&settings.logging)?;
    validate_pagination_config(&settings.pagination)?;

    Ok(())
}

fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(EgateError::Config("Server host is required".to_string()));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(EgateError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(EgateError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(EgateError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < MIN_SECRET_LENGTH {
        return Err(EgateError::Config(format!(
            "JWT secret must be at least {} characters",
            MIN_SECRET_LENGTH
        )));
    }

    if config.token_ttl_seconds <= 0 {
        return Err(EgateError::Config(
            "Token TTL must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EgateError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(EgateError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}

fn validate_pagination_config(config: &super::PaginationConfig) -> Result<()> {
    if config.page_size == 0 {
        return Err(EgateError::Config(
            "Page size must be greater than 0".to_string(),
        ));
    }

    if config.page_size > config.max_page_size {
        return Err(EgateError::Config(
            "Page size cannot be greater than max page size".to_string(),
        ));
    }

    Ok(())
}
