//! Attendance ledger

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::database::{EventStore, ResidentDirectory};
use crate::models::{
    AttendanceSelector, AttendanceView, CheckInOutcome, EventRegistration, MarkAttendanceRequest,
    Page, PageRequest, User,
};
use crate::utils::errors::{EgateError, Result};
use crate::utils::logging::log_admin_action;

#[derive(Clone)]
pub struct AttendanceLedger {
    store: Arc<dyn EventStore>,
    directory: Arc<dyn ResidentDirectory>,
}

impl AttendanceLedger {
    pub fn new(store: Arc<dyn EventStore>, directory: Arc<dyn ResidentDirectory>) -> Self {
        Self { store, directory }
    }

    /// Find the registration an admin is pointing at
    pub async fn resolve(&self, selector: &AttendanceSelector) -> Result<EventRegistration> {
        let registration = match selector {
            AttendanceSelector::Registration(id) => self.store.find_registration(*id).await?,
            AttendanceSelector::Profile { profile_id, event_id } => {
                match self.directory.find_by_profile_id(*profile_id).await? {
                    Some(resident) => {
                        self.store
                            .find_registration_for(*event_id, resident.id)
                            .await?
                    }
                    None => None,
                }
            }
            AttendanceSelector::Username { username, event_id } => {
                match self.directory.find_by_username(username).await? {
                    Some(resident) => {
                        self.store
                            .find_registration_for(*event_id, resident.id)
                            .await?
                    }
                    None => None,
                }
            }
        };

        registration.ok_or(EgateError::RegistrationNotFound)
    }

    /// Check a resident in; a repeated call returns the existing attendance
    pub async fn mark_attendance(
        &self,
        request: &MarkAttendanceRequest,
        verifier: &User,
    ) -> Result<CheckInOutcome> {
        let selector = request.selector()?;
        let registration = self.resolve(&selector).await?;
        debug!(?selector, registration_id = registration.id, "Resolved check-in selector");

        let outcome = self
            .store
            .check_in(registration.id, verifier.id, Utc::now())
            .await?;

        if outcome.is_created() {
            log_admin_action(
                verifier.id,
                "check_in",
                Some(&format!("registration {}", registration.id)),
                Some(&format!("event {}", registration.event_id)),
            );
        }
        Ok(outcome)
    }

    pub async fn list_for_event(&self, event_id: i64, page: PageRequest) -> Result<Page<AttendanceView>> {
        self.store.attendance_for_event(event_id, page).await
    }

    pub async fn list_all(&self, page: PageRequest) -> Result<Page<AttendanceView>> {
        self.store.all_attendance(page).await
    }
}
