//! Error handling for E-Gate
//!
//! This module defines the main error type used throughout the application
//! and the taxonomy it is reported under.

use serde::Serialize;
use thiserror::Error;

/// Main error type for the E-Gate backend
#[derive(Error, Debug)]
pub enum EgateError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Registration not found.")]
    RegistrationNotFound,

    #[error("Registration not yet open.")]
    RegistrationNotOpen,

    #[error("Registration closed.")]
    RegistrationClosed,

    #[error("Registration closed; cannot unregister.")]
    UnregistrationClosed,

    #[error("Event is at full capacity ({capacity}).")]
    CapacityExceeded { capacity: i32 },

    #[error("Already checked in; cannot unregister.")]
    AlreadyCheckedIn,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<config::ConfigError> for EgateError {
    fn from(err: config::ConfigError) -> Self {
        EgateError::Config(err.to_string())
    }
}

impl From<ValidationErrors> for EgateError {
    fn from(errors: ValidationErrors) -> Self {
        EgateError::Validation(errors)
    }
}

/// Result type alias for E-Gate operations
pub type Result<T> = std::result::Result<T, EgateError>;

/// Machine-readable error classification reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    BadRequest,
    Unauthorized,
    Internal,
}

impl EgateError {
    /// Classify the error for callers
    pub fn kind(&self) -> ErrorKind {
        match self {
            EgateError::Validation(_) => ErrorKind::Validation,
            EgateError::EventNotFound { .. } | EgateError::RegistrationNotFound => {
                ErrorKind::NotFound
            }
            EgateError::RegistrationNotOpen
            | EgateError::RegistrationClosed
            | EgateError::UnregistrationClosed
            | EgateError::CapacityExceeded { .. }
            | EgateError::AlreadyCheckedIn
            | EgateError::PermissionDenied(_) => ErrorKind::Forbidden,
            EgateError::BadRequest(_) => ErrorKind::BadRequest,
            EgateError::Authentication(_) => ErrorKind::Unauthorized,
            EgateError::Database(_)
            | EgateError::Migration(_)
            | EgateError::Config(_)
            | EgateError::Serialization(_)
            | EgateError::Io(_) => ErrorKind::Internal,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EgateError::Database(_) => ErrorSeverity::Critical,
            EgateError::Migration(_) => ErrorSeverity::Critical,
            EgateError::Config(_) => ErrorSeverity::Critical,
            EgateError::PermissionDenied(_) => ErrorSeverity::Warning,
            EgateError::Authentication(_) => ErrorSeverity::Warning,
            EgateError::Serialization(_) | EgateError::Io(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Info,
        }
    }

    /// Field-level details carried by validation failures
    pub fn details(&self) -> Option<&[FieldError]> {
        match self {
            EgateError::Validation(errors) => Some(errors.fields()),
            _ => None,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every constraint violated by one input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether a constraint on `field` was violated
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok` when nothing was recorded
    pub fn into_result(self) -> std::result::Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}
