//! Event repository implementation

use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Instant;

use crate::models::event::{Event, EventQuery, EventRow, NewEvent};
use crate::utils::errors::Result;
use crate::utils::helpers::escape_like;
use crate::utils::logging::log_database_operation;

pub(crate) const EVENT_COLUMNS: &str = "id, title, description, event_type, date, venue, capacity, registration_open, registration_close, status, created_by, created_at";

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(&self, request: NewEvent) -> Result<Event> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events (title, description, event_type, date, venue, capacity, registration_open, registration_close, status, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'upcoming', $9, $10)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.category.as_str())
        .bind(request.date)
        .bind(&request.venue)
        .bind(request.capacity)
        .bind(request.registration_open)
        .bind(request.registration_close)
        .bind(request.created_by)
        .bind(request.created_at)
        .fetch_one(&self.pool)
        .await;

        log_database_operation("insert", "events", started.elapsed().as_millis() as u64, row.is_ok());
        row?.try_into()
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Event::try_from).transpose()
    }

    /// Overwrite all mutable columns of an event
    pub async fn update(&self, event: &Event) -> Result<Option<Event>> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET title = $2,
                description = $3,
                event_type = $4,
                date = $5,
                venue = $6,
                capacity = $7,
                registration_open = $8,
                registration_close = $9,
                status = $10
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.category.as_str())
        .bind(event.date)
        .bind(&event.venue)
        .bind(event.capacity)
        .bind(event.registration_open)
        .bind(event.registration_close)
        .bind(event.status.as_str())
        .fetch_optional(&self.pool)
        .await;

        log_database_operation("update", "events", started.elapsed().as_millis() as u64, row.is_ok());
        row?.map(Event::try_from).transpose()
    }

    /// Delete event; registrations and attendance go with it
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List events matching a free-text filter
    pub async fn list(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {EVENT_COLUMNS} FROM events"));

        if let Some(term) = &query.search {
            let pattern = format!("%{}%", escape_like(term));
            builder.push(" WHERE title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR event_type ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR venue ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern);
        }

        builder.push(" ORDER BY ");
        builder.push(query.ordering.sql());

        let rows = builder
            .build_query_as::<EventRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Event::try_from).collect()
    }
}
