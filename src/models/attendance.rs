//! Event attendance model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::errors::{EgateError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EventAttendance {
    pub id: i64,
    pub registration_id: i64,
    pub checked_in_at: DateTime<Utc>,
    pub verified_by: i64,
}

/// Attendance joined with the registration it confirms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AttendanceView {
    pub id: i64,
    pub registration_id: i64,
    pub event_id: i64,
    pub event_title: String,
    pub resident_id: i64,
    pub resident_username: Option<String>,
    pub checked_in_at: DateTime<Utc>,
    pub verified_by: i64,
}

/// Check-in request body. Which registration is meant is decided by
/// [`MarkAttendanceRequest::selector`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkAttendanceRequest {
    pub registration_id: Option<i64>,
    #[serde(alias = "profile_id")]
    pub barangay_id: Option<Uuid>,
    pub username: Option<String>,
    pub event_id: Option<i64>,
}

/// How an admin identifies the registration being checked in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceSelector {
    Registration(i64),
    Profile { profile_id: Uuid, event_id: i64 },
    Username { username: String, event_id: i64 },
}

impl MarkAttendanceRequest {
    /// Registration id wins, then profile id + event, then username + event
    pub fn selector(&self) -> Result<AttendanceSelector> {
        if let Some(id) = self.registration_id {
            return Ok(AttendanceSelector::Registration(id));
        }

        let username = self.username.as_deref().map(str::trim).filter(|u| !u.is_empty());
        match (self.event_id, self.barangay_id, username) {
            (Some(event_id), Some(profile_id), _) => {
                Ok(AttendanceSelector::Profile { profile_id, event_id })
            }
            (Some(event_id), None, Some(username)) => Ok(AttendanceSelector::Username {
                username: username.to_string(),
                event_id,
            }),
            _ => Err(EgateError::BadRequest(
                "Provide registration_id, or event_id with barangay_id or username.".to_string(),
            )),
        }
    }
}

/// Result of a check-in that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum CheckInOutcome {
    CheckedIn(EventAttendance),
    AlreadyCheckedIn(EventAttendance),
}

impl CheckInOutcome {
    pub fn attendance(&self) -> &EventAttendance {
        match self {
            CheckInOutcome::CheckedIn(a) | CheckInOutcome::AlreadyCheckedIn(a) => a,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, CheckInOutcome::CheckedIn(_))
    }
}
