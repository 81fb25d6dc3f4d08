//! Test data builders

use chrono::{DateTime, Duration, Utc};

use egate::models::{EventCategory, NewEvent, Role, User};

pub fn admin() -> User {
    User::new(1, "kapitan", Role::Admin)
}

pub fn resident(id: i64) -> User {
    User::new(id, format!("resident{}", id), Role::Resident)
}

/// An event two days out with an open window and the given capacity
pub fn new_event(title: &str, capacity: Option<i32>) -> NewEvent {
    let now = Utc::now();
    NewEvent {
        title: title.to_string(),
        description: "Community event".to_string(),
        category: EventCategory::Community,
        date: now + Duration::days(2),
        venue: "Barangay Hall".to_string(),
        capacity,
        registration_open: None,
        registration_close: None,
        created_by: admin().id,
        created_at: now,
    }
}

pub fn with_window(
    mut event: NewEvent,
    open: Option<DateTime<Utc>>,
    close: Option<DateTime<Utc>>,
) -> NewEvent {
    event.registration_open = open;
    event.registration_close = close;
    event
}
