//! Event catalog
//!
//! Owns events: validates scheduling constraints on create and update and
//! serves listings.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::database::EventStore;
use crate::models::{
    CreateEventRequest, Event, EventCategory, EventQuery, EventStatus, NewEvent,
    UpdateEventRequest, User,
};
use crate::utils::errors::{EgateError, Result, ValidationErrors};

pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_VENUE_LENGTH: usize = 100;

/// Unvalidated event fields, either from a create payload or an update
/// merged onto the stored event
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub venue: String,
    pub capacity: Option<i32>,
    pub registration_open: Option<DateTime<Utc>>,
    pub registration_close: Option<DateTime<Utc>>,
    pub status: EventStatus,
}

/// Fields that passed every check
#[derive(Debug, Clone)]
pub struct ValidEvent {
    pub title: String,
    pub description: String,
    pub category: EventCategory,
    pub date: DateTime<Utc>,
    pub venue: String,
    pub capacity: Option<i32>,
    pub registration_open: Option<DateTime<Utc>>,
    pub registration_close: Option<DateTime<Utc>>,
    pub status: EventStatus,
}

impl From<CreateEventRequest> for EventDraft {
    fn from(request: CreateEventRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            category: request.category,
            date: request.date,
            venue: request.venue,
            capacity: request.capacity,
            registration_open: request.registration_open,
            registration_close: request.registration_close,
            status: EventStatus::Upcoming,
        }
    }
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            category: Some(event.category.as_str().to_string()),
            date: Some(event.date),
            venue: event.venue.clone(),
            capacity: event.capacity,
            registration_open: event.registration_open,
            registration_close: event.registration_close,
            status: event.status,
        }
    }
}

impl EventDraft {
    /// Overlay the fields present in `patch`
    pub fn merge(mut self, patch: UpdateEventRequest) -> Self {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if patch.category.is_some() {
            self.category = patch.category;
        }
        if patch.date.is_some() {
            self.date = patch.date;
        }
        if let Some(venue) = patch.venue {
            self.venue = venue;
        }
        if let Some(capacity) = patch.capacity {
            self.capacity = capacity;
        }
        if let Some(open) = patch.registration_open {
            self.registration_open = open;
        }
        if let Some(close) = patch.registration_close {
            self.registration_close = close;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self
    }

    /// Check every constraint, reporting all violations at once
    pub fn validate(self, now: DateTime<Utc>) -> std::result::Result<ValidEvent, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = self.title.trim().to_string();
        if title.is_empty() {
            errors.add("title", "This field is required.");
        } else if title.chars().count() > MAX_TITLE_LENGTH {
            errors.add(
                "title",
                format!("Ensure this field has no more than {} characters.", MAX_TITLE_LENGTH),
            );
        }

        let venue = self.venue.trim().to_string();
        if venue.chars().count() > MAX_VENUE_LENGTH {
            errors.add(
                "venue",
                format!("Ensure this field has no more than {} characters.", MAX_VENUE_LENGTH),
            );
        }

        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => {
                errors.add("category", "This field is required.");
                None
            }
            Some(raw) => match raw.parse::<EventCategory>() {
                Ok(category) => Some(category),
                Err(_) => {
                    errors.add("category", format!("\"{}\" is not a valid choice.", raw));
                    None
                }
            },
        };

        match self.date {
            None => errors.add("date", "This field is required."),
            Some(date) if date <= now => errors.add("date", "Event date must be in the future."),
            Some(_) => {}
        }

        if matches!(self.capacity, Some(capacity) if capacity < 0) {
            errors.add("capacity", "Capacity must be >= 0.");
        }

        if let (Some(open), Some(close)) = (self.registration_open, self.registration_close) {
            if open > close {
                errors.add("registration_open", "Registration open must be before close.");
            }
        }

        if let (Some(close), Some(date)) = (self.registration_close, self.date) {
            if close > date {
                errors.add(
                    "registration_close",
                    "Registration close must be on or before the event date.",
                );
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        match (category, self.date) {
            (Some(category), Some(date)) => Ok(ValidEvent {
                title,
                description: self.description,
                category,
                date,
                venue,
                capacity: self.capacity,
                registration_open: self.registration_open,
                registration_close: self.registration_close,
                status: self.status,
            }),
            // unreachable: both were recorded as errors above
            _ => Err(errors),
        }
    }
}

impl ValidEvent {
    pub fn into_new_event(self, created_by: i64, created_at: DateTime<Utc>) -> NewEvent {
        NewEvent {
            title: self.title,
            description: self.description,
            category: self.category,
            date: self.date,
            venue: self.venue,
            capacity: self.capacity,
            registration_open: self.registration_open,
            registration_close: self.registration_close,
            created_by,
            created_at,
        }
    }

    /// Overwrite the mutable fields of `event`
    pub fn apply_to(self, event: Event) -> Event {
        Event {
            title: self.title,
            description: self.description,
            category: self.category,
            date: self.date,
            venue: self.venue,
            capacity: self.capacity,
            registration_open: self.registration_open,
            registration_close: self.registration_close,
            status: self.status,
            ..event
        }
    }
}

#[derive(Clone)]
pub struct EventCatalog {
    store: Arc<dyn EventStore>,
}

impl EventCatalog {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn create_event(&self, request: CreateEventRequest, creator: &User) -> Result<Event> {
        let now = Utc::now();
        let valid = EventDraft::from(request).validate(now)?;

        let event = self.store.insert_event(valid.into_new_event(creator.id, now)).await?;
        info!(event_id = event.id, created_by = creator.id, "Event created");
        Ok(event)
    }

    /// Merge `patch` onto the stored event and re-validate the result
    pub async fn update_event(&self, id: i64, patch: UpdateEventRequest) -> Result<Event> {
        let existing = self.get_event(id).await?;
        let valid = EventDraft::from(&existing).merge(patch).validate(Utc::now())?;

        let event = self
            .store
            .replace_event(&valid.apply_to(existing))
            .await?
            .ok_or(EgateError::EventNotFound { event_id: id })?;
        info!(event_id = event.id, "Event updated");
        Ok(event)
    }

    pub async fn delete_event(&self, id: i64) -> Result<()> {
        if !self.store.delete_event(id).await? {
            return Err(EgateError::EventNotFound { event_id: id });
        }
        info!(event_id = id, "Event deleted");
        Ok(())
    }

    pub async fn get_event(&self, id: i64) -> Result<Event> {
        self.store
            .find_event(id)
            .await?
            .ok_or(EgateError::EventNotFound { event_id: id })
    }

    pub async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>> {
        debug!(search = ?query.search, ordering = ?query.ordering, "Listing events");
        self.store.list_events(query).await
    }
}
