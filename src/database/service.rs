//! Postgres-backed store
//!
//! Composes the per-table repositories behind the storage traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::store::{EventStore, ResidentDirectory};
use crate::database::{
    connection, AttendanceRepository, DatabasePool, EventRepository, RegistrationRepository,
    ResidentRepository,
};
use crate::models::*;
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DatabasePool,
    pub events: EventRepository,
    pub registrations: RegistrationRepository,
    pub attendance: AttendanceRepository,
    pub residents: ResidentRepository,
}

impl PgStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            attendance: AttendanceRepository::new(pool.clone()),
            residents: ResidentRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn insert_event(&self, event: NewEvent) -> Result<Event> {
        self.events.create(event).await
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>> {
        self.events.find_by_id(id).await
    }

    async fn replace_event(&self, event: &Event) -> Result<Option<Event>> {
        self.events.update(event).await
    }

    async fn delete_event(&self, id: i64) -> Result<bool> {
        self.events.delete(id).await
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>> {
        self.events.list(query).await
    }

    async fn register(
        &self,
        event_id: i64,
        resident_id: i64,
        now: DateTime<Utc>,
    ) -> Result<RegistrationOutcome> {
        self.registrations.register(event_id, resident_id, now).await
    }

    async fn unregister(
        &self,
        event_id: i64,
        resident_id: i64,
        now: DateTime<Utc>,
    ) -> Result<UnregisterOutcome> {
        self.registrations.unregister(event_id, resident_id, now).await
    }

    async fn find_registration(&self, id: i64) -> Result<Option<EventRegistration>> {
        self.registrations.find_by_id(id).await
    }

    async fn find_registration_for(
        &self,
        event_id: i64,
        resident_id: i64,
    ) -> Result<Option<EventRegistration>> {
        self.registrations.find_for(event_id, resident_id).await
    }

    async fn registrations_for_resident(&self, resident_id: i64) -> Result<Vec<RegistrationView>> {
        self.registrations.list_for_resident(resident_id).await
    }

    async fn registrations_for_event(&self, event_id: i64) -> Result<Vec<RegistrationView>> {
        self.registrations.list_for_event(event_id).await
    }

    async fn has_attendance(&self, registration_id: i64) -> Result<bool> {
        self.attendance.exists_for(registration_id).await
    }

    async fn check_in(
        &self,
        registration_id: i64,
        verified_by: i64,
        now: DateTime<Utc>,
    ) -> Result<CheckInOutcome> {
        self.attendance.check_in(registration_id, verified_by, now).await
    }

    async fn attendance_for_event(
        &self,
        event_id: i64,
        page: PageRequest,
    ) -> Result<Page<AttendanceView>> {
        self.attendance.list_for_event(event_id, page).await
    }

    async fn all_attendance(&self, page: PageRequest) -> Result<Page<AttendanceView>> {
        self.attendance.list_all(page).await
    }

    async fn ping(&self) -> Result<()> {
        connection::health_check(&self.pool).await
    }
}

#[async_trait]
impl ResidentDirectory for PgStore {
    async fn find_by_profile_id(&self, profile_id: Uuid) -> Result<Option<Resident>> {
        self.residents.find_by_profile_id(profile_id).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Resident>> {
        self.residents.find_by_username(username).await
    }
}
