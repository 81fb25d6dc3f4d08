//! In-process store
//!
//! Every operation runs under one mutex, which makes each trait call a
//! serializable transaction. Used by tests and by `database.url = "memory"`.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::database::store::{EventStore, ResidentDirectory};
use crate::models::*;
use crate::utils::errors::{EgateError, Result};

#[derive(Debug, Default)]
struct MemoryState {
    events: BTreeMap<i64, Event>,
    registrations: BTreeMap<i64, EventRegistration>,
    attendance: BTreeMap<i64, EventAttendance>,
    residents: HashMap<i64, Resident>,
    next_event_id: i64,
    next_registration_id: i64,
    next_attendance_id: i64,
}

impl MemoryState {
    fn registration_for(&self, event_id: i64, resident_id: i64) -> Option<&EventRegistration> {
        self.registrations
            .values()
            .find(|r| r.event_id == event_id && r.resident_id == resident_id)
    }

    fn attendance_for(&self, registration_id: i64) -> Option<&EventAttendance> {
        self.attendance
            .values()
            .find(|a| a.registration_id == registration_id)
    }

    fn is_checked_in(&self, registration_id: i64) -> bool {
        self.attendance_for(registration_id).is_some()
    }

    fn username(&self, resident_id: i64) -> Option<String> {
        self.residents.get(&resident_id).map(|r| r.username.clone())
    }

    fn registration_view(&self, registration: &EventRegistration) -> Option<RegistrationView> {
        let event = self.events.get(&registration.event_id)?;
        Some(RegistrationView {
            id: registration.id,
            event: registration.event_id,
            event_title: event.title.clone(),
            resident: registration.resident_id,
            resident_username: self.username(registration.resident_id),
            registered_at: registration.registered_at,
            attendance_confirmed: registration.attendance_confirmed,
        })
    }

    fn attendance_view(&self, attendance: &EventAttendance) -> Option<AttendanceView> {
        let registration = self.registrations.get(&attendance.registration_id)?;
        let event = self.events.get(&registration.event_id)?;
        Some(AttendanceView {
            id: attendance.id,
            registration_id: registration.id,
            event_id: event.id,
            event_title: event.title.clone(),
            resident_id: registration.resident_id,
            resident_username: self.username(registration.resident_id),
            checked_in_at: attendance.checked_in_at,
            verified_by: attendance.verified_by,
        })
    }

    fn attendance_page<F>(&self, page: PageRequest, filter: F) -> Page<AttendanceView>
    where
        F: Fn(&AttendanceView) -> bool,
    {
        let mut views: Vec<AttendanceView> = self
            .attendance
            .values()
            .filter_map(|a| self.attendance_view(a))
            .filter(|v| filter(v))
            .collect();
        views.sort_by(|a, b| b.checked_in_at.cmp(&a.checked_in_at).then(b.id.cmp(&a.id)));

        let count = views.len() as i64;
        let results = views
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Page::new(page, count, results)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror a resident from the identity provider
    pub fn add_resident(&self, resident: Resident) {
        self.state.lock().residents.insert(resident.id, resident);
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, event: NewEvent) -> Result<Event> {
        let mut state = self.state.lock();
        state.next_event_id += 1;
        let event = event.into_event(state.next_event_id);
        state.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>> {
        Ok(self.state.lock().events.get(&id).cloned())
    }

    async fn replace_event(&self, event: &Event) -> Result<Option<Event>> {
        let mut state = self.state.lock();
        match state.events.get_mut(&event.id) {
            Some(stored) => {
                // creator and creation time are immutable
                *stored = Event {
                    created_by: stored.created_by,
                    created_at: stored.created_at,
                    ..event.clone()
                };
                Ok(Some(stored.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_event(&self, id: i64) -> Result<bool> {
        let mut state = self.state.lock();
        if state.events.remove(&id).is_none() {
            return Ok(false);
        }

        let removed: Vec<i64> = state
            .registrations
            .values()
            .filter(|r| r.event_id == id)
            .map(|r| r.id)
            .collect();
        state.registrations.retain(|_, r| r.event_id != id);
        state
            .attendance
            .retain(|_, a| !removed.contains(&a.registration_id));
        Ok(true)
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let state = self.state.lock();
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        events.sort_by(|a, b| query.ordering.compare(a, b));
        Ok(events)
    }

    async fn register(
        &self,
        event_id: i64,
        resident_id: i64,
        now: DateTime<Utc>,
    ) -> Result<RegistrationOutcome> {
        let mut state = self.state.lock();
        let event = state
            .events
            .get(&event_id)
            .ok_or(EgateError::EventNotFound { event_id })?;

        event.ensure_registration_open(now)?;

        let current = state
            .registrations
            .values()
            .filter(|r| r.event_id == event_id)
            .count() as i64;
        event.ensure_capacity(current)?;

        if let Some(existing) = state.registration_for(event_id, resident_id) {
            return Ok(RegistrationOutcome::AlreadyRegistered(existing.clone()));
        }

        state.next_registration_id += 1;
        let registration = EventRegistration {
            id: state.next_registration_id,
            event_id,
            resident_id,
            registered_at: now,
            attendance_confirmed: false,
        };
        state.registrations.insert(registration.id, registration.clone());
        Ok(RegistrationOutcome::Created(registration))
    }

    async fn unregister(
        &self,
        event_id: i64,
        resident_id: i64,
        now: DateTime<Utc>,
    ) -> Result<UnregisterOutcome> {
        let mut state = self.state.lock();
        let event = state
            .events
            .get(&event_id)
            .ok_or(EgateError::EventNotFound { event_id })?;

        event.ensure_unregistration_open(now)?;

        let registration_id = match state.registration_for(event_id, resident_id) {
            Some(registration) => registration.id,
            None => return Ok(UnregisterOutcome::NotRegistered),
        };

        if state.is_checked_in(registration_id) {
            return Err(EgateError::AlreadyCheckedIn);
        }

        state.registrations.remove(&registration_id);
        Ok(UnregisterOutcome::Removed)
    }

    async fn find_registration(&self, id: i64) -> Result<Option<EventRegistration>> {
        Ok(self.state.lock().registrations.get(&id).cloned())
    }

    async fn find_registration_for(
        &self,
        event_id: i64,
        resident_id: i64,
    ) -> Result<Option<EventRegistration>> {
        Ok(self
            .state
            .lock()
            .registration_for(event_id, resident_id)
            .cloned())
    }

    async fn registrations_for_resident(&self, resident_id: i64) -> Result<Vec<RegistrationView>> {
        let state = self.state.lock();
        let mut registrations: Vec<&EventRegistration> = state
            .registrations
            .values()
            .filter(|r| r.resident_id == resident_id)
            .collect();
        registrations.sort_by_key(|r| (state.events.get(&r.event_id).map(|e| e.date), r.id));

        Ok(registrations
            .into_iter()
            .filter_map(|r| state.registration_view(r))
            .collect())
    }

    async fn registrations_for_event(&self, event_id: i64) -> Result<Vec<RegistrationView>> {
        let state = self.state.lock();
        let mut registrations: Vec<&EventRegistration> = state
            .registrations
            .values()
            .filter(|r| r.event_id == event_id)
            .collect();
        registrations.sort_by_key(|r| (r.registered_at, r.id));

        Ok(registrations
            .into_iter()
            .filter_map(|r| state.registration_view(r))
            .collect())
    }

    async fn has_attendance(&self, registration_id: i64) -> Result<bool> {
        Ok(self.state.lock().is_checked_in(registration_id))
    }

    async fn check_in(
        &self,
        registration_id: i64,
        verified_by: i64,
        now: DateTime<Utc>,
    ) -> Result<CheckInOutcome> {
        let mut state = self.state.lock();
        if !state.registrations.contains_key(&registration_id) {
            return Err(EgateError::RegistrationNotFound);
        }

        if let Some(existing) = state.attendance_for(registration_id) {
            return Ok(CheckInOutcome::AlreadyCheckedIn(existing.clone()));
        }

        state.next_attendance_id += 1;
        let attendance = EventAttendance {
            id: state.next_attendance_id,
            registration_id,
            checked_in_at: now,
            verified_by,
        };
        state.attendance.insert(attendance.id, attendance.clone());
        if let Some(registration) = state.registrations.get_mut(&registration_id) {
            registration.attendance_confirmed = true;
        }
        Ok(CheckInOutcome::CheckedIn(attendance))
    }

    async fn attendance_for_event(
        &self,
        event_id: i64,
        page: PageRequest,
    ) -> Result<Page<AttendanceView>> {
        Ok(self
            .state
            .lock()
            .attendance_page(page, |v| v.event_id == event_id))
    }

    async fn all_attendance(&self, page: PageRequest) -> Result<Page<AttendanceView>> {
        Ok(self.state.lock().attendance_page(page, |_| true))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl ResidentDirectory for MemoryStore {
    async fn find_by_profile_id(&self, profile_id: Uuid) -> Result<Option<Resident>> {
        Ok(self
            .state
            .lock()
            .residents
            .values()
            .find(|r| r.profile_id == profile_id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Resident>> {
        Ok(self
            .state
            .lock()
            .residents
            .values()
            .find(|r| r.username == username)
            .cloned())
    }
}
