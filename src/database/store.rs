//! Storage seams used by the ledgers
//!
//! Implementations must apply the registration rules on [`Event`] inside the
//! same critical section as the insert or delete they guard.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    AttendanceView, CheckInOutcome, Event, EventQuery, EventRegistration, NewEvent, Page,
    PageRequest, RegistrationOutcome, RegistrationView, Resident, UnregisterOutcome,
};
use crate::utils::errors::Result;

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_event(&self, event: NewEvent) -> Result<Event>;

    async fn find_event(&self, id: i64) -> Result<Option<Event>>;

    /// Overwrite every mutable column; `None` when the event no longer exists
    async fn replace_event(&self, event: &Event) -> Result<Option<Event>>;

    /// Delete with cascade; `false` when nothing was deleted
    async fn delete_event(&self, id: i64) -> Result<bool>;

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>>;

    /// Window check, duplicate detection, capacity check and insert, serialized per event
    async fn register(
        &self,
        event_id: i64,
        resident_id: i64,
        now: DateTime<Utc>,
    ) -> Result<RegistrationOutcome>;

    /// Close check, attendance lock and delete, serialized against check-in
    async fn unregister(
        &self,
        event_id: i64,
        resident_id: i64,
        now: DateTime<Utc>,
    ) -> Result<UnregisterOutcome>;

    async fn find_registration(&self, id: i64) -> Result<Option<EventRegistration>>;

    async fn find_registration_for(
        &self,
        event_id: i64,
        resident_id: i64,
    ) -> Result<Option<EventRegistration>>;

    async fn registrations_for_resident(&self, resident_id: i64) -> Result<Vec<RegistrationView>>;

    async fn registrations_for_event(&self, event_id: i64) -> Result<Vec<RegistrationView>>;

    async fn has_attendance(&self, registration_id: i64) -> Result<bool>;

    /// Insert-or-return-existing keyed on the registration
    async fn check_in(
        &self,
        registration_id: i64,
        verified_by: i64,
        now: DateTime<Utc>,
    ) -> Result<CheckInOutcome>;

    async fn attendance_for_event(
        &self,
        event_id: i64,
        page: PageRequest,
    ) -> Result<Page<AttendanceView>>;

    async fn all_attendance(&self, page: PageRequest) -> Result<Page<AttendanceView>>;

    /// Cheap liveness probe
    async fn ping(&self) -> Result<()>;
}

/// Read-only resident lookup backed by the identity provider's data
#[async_trait]
pub trait ResidentDirectory: Send + Sync {
    async fn find_by_profile_id(&self, profile_id: Uuid) -> Result<Option<Resident>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Resident>>;
}
