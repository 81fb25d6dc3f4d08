//! Attendance repository implementation

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::models::attendance::{AttendanceView, CheckInOutcome, EventAttendance};
use crate::models::page::{Page, PageRequest};
use crate::utils::errors::{EgateError, Result};

const ATTENDANCE_COLUMNS: &str = "id, registration_id, checked_in_at, verified_by";

const VIEW_SELECT: &str = r#"
    SELECT a.id, a.registration_id, r.event_id, e.title AS event_title, r.resident_id,
           p.username AS resident_username, a.checked_in_at, a.verified_by
    FROM event_attendance a
    JOIN event_registrations r ON r.id = a.registration_id
    JOIN events e ON e.id = r.event_id
    LEFT JOIN residents p ON p.id = r.resident_id
"#;

/// Postgres `foreign_key_violation`
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists_for(&self, registration_id: i64) -> Result<bool> {
        Self::exists_in(&self.pool, registration_id).await
    }

    /// Whether a registration has been checked in, inside any executor
    /// (pool or an open transaction)
    pub async fn exists_in<'e, E>(executor: E, registration_id: i64) -> Result<bool>
    where
        E: PgExecutor<'e>,
    {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM event_attendance WHERE registration_id = $1)",
        )
        .bind(registration_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Record a check-in; the unique `registration_id` decides concurrent races
    pub async fn check_in(
        &self,
        registration_id: i64,
        verified_by: i64,
        now: DateTime<Utc>,
    ) -> Result<CheckInOutcome> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, EventAttendance>(&format!(
            r#"
            INSERT INTO event_attendance (registration_id, checked_in_at, verified_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (registration_id) DO NOTHING
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        ))
        .bind(registration_id)
        .bind(now)
        .bind(verified_by)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            let orphaned = matches!(
                &e,
                sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
            );
            if orphaned {
                EgateError::RegistrationNotFound
            } else {
                EgateError::Database(e)
            }
        })?;

        let outcome = match inserted {
            Some(attendance) => {
                sqlx::query("UPDATE event_registrations SET attendance_confirmed = TRUE WHERE id = $1")
                    .bind(registration_id)
                    .execute(&mut *tx)
                    .await?;
                CheckInOutcome::CheckedIn(attendance)
            }
            None => {
                let existing = sqlx::query_as::<_, EventAttendance>(&format!(
                    "SELECT {ATTENDANCE_COLUMNS} FROM event_attendance WHERE registration_id = $1"
                ))
                .bind(registration_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(EgateError::RegistrationNotFound)?;
                CheckInOutcome::AlreadyCheckedIn(existing)
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Check-ins for one event, newest first
    pub async fn list_for_event(&self, event_id: i64, page: PageRequest) -> Result<Page<AttendanceView>> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM event_attendance a
            JOIN event_registrations r ON r.id = a.registration_id
            WHERE r.event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        let results = sqlx::query_as::<_, AttendanceView>(&format!(
            "{VIEW_SELECT} WHERE r.event_id = $1 ORDER BY a.checked_in_at DESC, a.id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(event_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(page, count, results))
    }

    /// Every check-in, newest first
    pub async fn list_all(&self, page: PageRequest) -> Result<Page<AttendanceView>> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM event_attendance")
            .fetch_one(&self.pool)
            .await?;

        let results = sqlx::query_as::<_, AttendanceView>(&format!(
            "{VIEW_SELECT} ORDER BY a.checked_in_at DESC, a.id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(page, count, results))
    }
}
