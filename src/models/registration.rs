//! Event registration model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EventRegistration {
    pub id: i64,
    pub event_id: i64,
    pub resident_id: i64,
    pub registered_at: DateTime<Utc>,
    /// Mirrors whether an attendance row exists; the attendance table is authoritative
    pub attendance_confirmed: bool,
}

/// Registration joined with its event title and resident username
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RegistrationView {
    pub id: i64,
    #[sqlx(rename = "event_id")]
    pub event: i64,
    pub event_title: String,
    #[sqlx(rename = "resident_id")]
    pub resident: i64,
    pub resident_username: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub attendance_confirmed: bool,
}

/// Result of a registration attempt that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    Created(EventRegistration),
    AlreadyRegistered(EventRegistration),
}

impl RegistrationOutcome {
    pub fn registration(&self) -> &EventRegistration {
        match self {
            RegistrationOutcome::Created(r) | RegistrationOutcome::AlreadyRegistered(r) => r,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, RegistrationOutcome::Created(_))
    }
}

/// Result of an unregistration attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnregisterOutcome {
    Removed,
    NotRegistered,
}
