//! Event model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::utils::errors::{EgateError, Result};

/// Kind of community event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum EventCategory {
    Medical,
    Vaccination,
    Assembly,
    Relief,
    Community,
    SkElection,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Medical => "medical",
            EventCategory::Vaccination => "vaccination",
            EventCategory::Assembly => "assembly",
            EventCategory::Relief => "relief",
            EventCategory::Community => "community",
            EventCategory::SkElection => "sk_election",
        }
    }
}

impl FromStr for EventCategory {
    type Err = String;

    /// Case-insensitive: `Medical` and `MEDICAL` both parse.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "medical" => Ok(EventCategory::Medical),
            "vaccination" => Ok(EventCategory::Vaccination),
            "assembly" => Ok(EventCategory::Assembly),
            "relief" => Ok(EventCategory::Relief),
            "community" => Ok(EventCategory::Community),
            "sk_election" => Ok(EventCategory::SkElection),
            other => Err(format!("\"{}\" is not a valid category.", other)),
        }
    }
}

impl TryFrom<String> for EventCategory {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(EventStatus::Upcoming),
            "ongoing" => Ok(EventStatus::Ongoing),
            "completed" => Ok(EventStatus::Completed),
            "cancelled" => Ok(EventStatus::Cancelled),
            other => Err(format!("\"{}\" is not a valid status.", other)),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "event_type")]
    pub category: EventCategory,
    pub date: DateTime<Utc>,
    pub venue: String,
    pub capacity: Option<i32>,
    pub registration_open: Option<DateTime<Utc>>,
    pub registration_close: Option<DateTime<Utc>>,
    pub status: EventStatus,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Registration is only accepted inside `[registration_open, registration_close]`
    pub fn ensure_registration_open(&self, now: DateTime<Utc>) -> Result<()> {
        if let Some(open) = self.registration_open {
            if now < open {
                return Err(EgateError::RegistrationNotOpen);
            }
        }
        if let Some(close) = self.registration_close {
            if now > close {
                return Err(EgateError::RegistrationClosed);
            }
        }
        Ok(())
    }

    /// Residents may withdraw until registration closes
    pub fn ensure_unregistration_open(&self, now: DateTime<Utc>) -> Result<()> {
        match self.registration_close {
            Some(close) if now > close => Err(EgateError::UnregistrationClosed),
            _ => Ok(()),
        }
    }

    /// A new registration fits only while `current < capacity`
    pub fn ensure_capacity(&self, current: i64) -> Result<()> {
        match self.capacity {
            Some(capacity) if current >= i64::from(capacity) => {
                Err(EgateError::CapacityExceeded { capacity })
            }
            _ => Ok(()),
        }
    }
}

/// Raw `events` row; enum columns are stored as text
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub date: DateTime<Utc>,
    pub venue: String,
    pub capacity: Option<i32>,
    pub registration_open: Option<DateTime<Utc>>,
    pub registration_close: Option<DateTime<Utc>>,
    pub status: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = EgateError;

    fn try_from(row: EventRow) -> Result<Self> {
        let category = row
            .event_type
            .parse()
            .map_err(|e: String| EgateError::Database(sqlx::Error::Decode(e.into())))?;
        let status = row
            .status
            .parse()
            .map_err(|e: String| EgateError::Database(sqlx::Error::Decode(e.into())))?;

        Ok(Event {
            id: row.id,
            title: row.title,
            description: row.description,
            category,
            date: row.date,
            venue: row.venue,
            capacity: row.capacity,
            registration_open: row.registration_open,
            registration_close: row.registration_close,
            status,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

/// Payload for creating an event.
///
/// `category` stays a raw string so an unknown value is reported alongside
/// every other violated constraint instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateEventRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "event_type", alias = "category")]
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub venue: String,
    pub capacity: Option<i32>,
    pub registration_open: Option<DateTime<Utc>>,
    pub registration_close: Option<DateTime<Utc>>,
}

/// Partial update payload.
///
/// Nullable columns use `Option<Option<_>>`: an absent key keeps the stored
/// value, an explicit `null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "event_type", alias = "category")]
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub capacity: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub registration_open: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub registration_close: Option<Option<DateTime<Utc>>>,
    pub status: Option<EventStatus>,
}

fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Validated event ready to be inserted
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub category: EventCategory,
    pub date: DateTime<Utc>,
    pub venue: String,
    pub capacity: Option<i32>,
    pub registration_open: Option<DateTime<Utc>>,
    pub registration_close: Option<DateTime<Utc>>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl NewEvent {
    /// Materialize with the id assigned by the store; new events start upcoming
    pub fn into_event(self, id: i64) -> Event {
        Event {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            date: self.date,
            venue: self.venue,
            capacity: self.capacity,
            registration_open: self.registration_open,
            registration_close: self.registration_close,
            status: EventStatus::Upcoming,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

/// Sort order for event listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventOrdering {
    DateAsc,
    #[default]
    DateDesc,
    TitleAsc,
    TitleDesc,
}

impl EventOrdering {
    /// Parse `date`, `-date`, `title` or `-title`; anything else falls back to `-date`
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("date") => EventOrdering::DateAsc,
            Some("-date") => EventOrdering::DateDesc,
            Some("title") => EventOrdering::TitleAsc,
            Some("-title") => EventOrdering::TitleDesc,
            _ => EventOrdering::default(),
        }
    }

    /// SQL `ORDER BY` clause; `id` breaks ties so listings are stable
    pub fn sql(&self) -> &'static str {
        match self {
            EventOrdering::DateAsc => "date ASC, id ASC",
            EventOrdering::DateDesc => "date DESC, id DESC",
            EventOrdering::TitleAsc => "title ASC, id ASC",
            EventOrdering::TitleDesc => "title DESC, id DESC",
        }
    }

    pub fn compare(&self, a: &Event, b: &Event) -> std::cmp::Ordering {
        match self {
            EventOrdering::DateAsc => a.date.cmp(&b.date).then(a.id.cmp(&b.id)),
            EventOrdering::DateDesc => b.date.cmp(&a.date).then(b.id.cmp(&a.id)),
            EventOrdering::TitleAsc => a.title.cmp(&b.title).then(a.id.cmp(&b.id)),
            EventOrdering::TitleDesc => b.title.cmp(&a.title).then(b.id.cmp(&a.id)),
        }
    }
}

/// Filter and ordering for `list_events`
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Lowercased free-text term matched against title, category, venue and description
    pub search: Option<String>,
    pub ordering: EventOrdering,
}

impl EventQuery {
    pub fn new(search: Option<&str>, ordering: Option<&str>) -> Self {
        Self {
            search: crate::utils::helpers::normalize_search_term(search),
            ordering: EventOrdering::parse(ordering),
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        match &self.search {
            Some(term) => crate::utils::helpers::matches_any(
                &[
                    &event.title,
                    event.category.as_str(),
                    &event.venue,
                    &event.description,
                ],
                term,
            ),
            None => true,
        }
    }
}
