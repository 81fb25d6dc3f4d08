//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the E-Gate backend.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::utils::errors::{EgateError, ErrorSeverity, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer when dropped, so the caller
/// must keep it alive for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| EgateError::Config(format!("Invalid log filter: {}", e)))?;

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "egate.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_ansi(false).with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let json_layer = config
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stdout));
    let plain_layer = (!config.json).then(|| fmt::layer().with_writer(std::io::stdout));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(plain_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| EgateError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log event management actions
pub fn log_event_action(event_id: i64, action: &str, user_id: i64, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        user_id = user_id,
        details = details,
        "Event action performed"
    );
}

/// Log admin actions
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}

/// Log a failed request with its classification
pub fn log_request_error(err: &EgateError) {
    match err.severity() {
        ErrorSeverity::Critical | ErrorSeverity::Error => {
            error!(kind = ?err.kind(), severity = %err.severity(), error = %err, "Request failed")
        }
        ErrorSeverity::Warning => {
            warn!(kind = ?err.kind(), error = %err, "Request rejected")
        }
        ErrorSeverity::Info => {
            debug!(kind = ?err.kind(), error = %err, "Request rejected")
        }
    }
}
