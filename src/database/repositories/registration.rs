//! Registration repository implementation
//!
//! `register` and `unregister` run inside a transaction that holds a row lock
//! on the event, so capacity counts and window checks see a stable state.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use super::attendance::AttendanceRepository;
use super::event::EVENT_COLUMNS;
use crate::models::event::{Event, EventRow};
use crate::models::registration::{
    EventRegistration, RegistrationOutcome, RegistrationView, UnregisterOutcome,
};
use crate::utils::errors::{EgateError, Result};

const REGISTRATION_COLUMNS: &str = "id, event_id, resident_id, registered_at, attendance_confirmed";

const VIEW_SELECT: &str = r#"
    SELECT r.id, r.event_id, e.title AS event_title, r.resident_id, p.username AS resident_username,
           r.registered_at, r.attendance_confirmed
    FROM event_registrations r
    JOIN events e ON e.id = r.event_id
    LEFT JOIN residents p ON p.id = r.resident_id
"#;

#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_event(tx: &mut Transaction<'_, Postgres>, event_id: i64) -> Result<Event> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(EgateError::EventNotFound { event_id })?;

        row.try_into()
    }

    async fn find_in(
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
        resident_id: i64,
        lock: bool,
    ) -> Result<Option<EventRegistration>> {
        let suffix = if lock { " FOR UPDATE" } else { "" };
        let registration = sqlx::query_as::<_, EventRegistration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations WHERE event_id = $1 AND resident_id = $2{suffix}"
        ))
        .bind(event_id)
        .bind(resident_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(registration)
    }

    /// Register a resident for an event
    pub async fn register(
        &self,
        event_id: i64,
        resident_id: i64,
        now: DateTime<Utc>,
    ) -> Result<RegistrationOutcome> {
        let mut tx = self.pool.begin().await?;
        let event = Self::lock_event(&mut tx, event_id).await?;

        event.ensure_registration_open(now)?;

        // a full event rejects everyone, including residents already on it
        if event.capacity.is_some() {
            let (current,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM event_registrations WHERE event_id = $1")
                    .bind(event_id)
                    .fetch_one(&mut *tx)
                    .await?;
            event.ensure_capacity(current)?;
        }

        if let Some(existing) = Self::find_in(&mut tx, event_id, resident_id, false).await? {
            tx.commit().await?;
            return Ok(RegistrationOutcome::AlreadyRegistered(existing));
        }

        let inserted = sqlx::query_as::<_, EventRegistration>(&format!(
            r#"
            INSERT INTO event_registrations (event_id, resident_id, registered_at, attendance_confirmed)
            VALUES ($1, $2, $3, FALSE)
            ON CONFLICT (event_id, resident_id) DO NOTHING
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(resident_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match inserted {
            Some(registration) => RegistrationOutcome::Created(registration),
            None => {
                debug!(event_id, resident_id, "Registration raced with a concurrent insert");
                let existing = Self::find_in(&mut tx, event_id, resident_id, false)
                    .await?
                    .ok_or(EgateError::RegistrationNotFound)?;
                RegistrationOutcome::AlreadyRegistered(existing)
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Withdraw a resident's registration unless they already checked in
    pub async fn unregister(
        &self,
        event_id: i64,
        resident_id: i64,
        now: DateTime<Utc>,
    ) -> Result<UnregisterOutcome> {
        let mut tx = self.pool.begin().await?;
        let event = Self::lock_event(&mut tx, event_id).await?;

        event.ensure_unregistration_open(now)?;

        let registration = match Self::find_in(&mut tx, event_id, resident_id, true).await? {
            Some(registration) => registration,
            None => {
                tx.commit().await?;
                return Ok(UnregisterOutcome::NotRegistered);
            }
        };

        if AttendanceRepository::exists_in(&mut *tx, registration.id).await? {
            return Err(EgateError::AlreadyCheckedIn);
        }

        sqlx::query("DELETE FROM event_registrations WHERE id = $1")
            .bind(registration.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(UnregisterOutcome::Removed)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<EventRegistration>> {
        let registration = sqlx::query_as::<_, EventRegistration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    pub async fn find_for(&self, event_id: i64, resident_id: i64) -> Result<Option<EventRegistration>> {
        let registration = sqlx::query_as::<_, EventRegistration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations WHERE event_id = $1 AND resident_id = $2"
        ))
        .bind(event_id)
        .bind(resident_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Registrations of one resident, soonest event first
    pub async fn list_for_resident(&self, resident_id: i64) -> Result<Vec<RegistrationView>> {
        let views = sqlx::query_as::<_, RegistrationView>(&format!(
            "{VIEW_SELECT} WHERE r.resident_id = $1 ORDER BY e.date ASC, r.id ASC"
        ))
        .bind(resident_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(views)
    }

    /// Registrants of one event in registration order
    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<RegistrationView>> {
        let views = sqlx::query_as::<_, RegistrationView>(&format!(
            "{VIEW_SELECT} WHERE r.event_id = $1 ORDER BY r.registered_at ASC, r.id ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(views)
    }
}
