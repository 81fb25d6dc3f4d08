//! Event lifecycle service
//!
//! Public, role-gated entry point over the catalog and the two ledgers.
//! The access check always runs before the underlying operation.

use std::sync::Arc;

use crate::models::{
    AttendanceView, CheckInOutcome, CreateEventRequest, Event, EventQuery, MarkAttendanceRequest,
    Page, PageRequest, RegistrationOutcome, RegistrationView, Role, UnregisterOutcome,
    UpdateEventRequest, User,
};
use crate::services::{AccessPolicy, AttendanceLedger, EventCatalog, RegistrationLedger};
use crate::utils::errors::{EgateError, Result};
use crate::utils::logging::log_admin_action;

#[derive(Clone)]
pub struct EventLifecycleService {
    catalog: EventCatalog,
    registrations: RegistrationLedger,
    attendance: AttendanceLedger,
    policy: Arc<dyn AccessPolicy>,
}

impl EventLifecycleService {
    pub fn new(
        catalog: EventCatalog,
        registrations: RegistrationLedger,
        attendance: AttendanceLedger,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        Self {
            catalog,
            registrations,
            attendance,
            policy,
        }
    }

    fn require(&self, user: &User, role: Role) -> Result<()> {
        if self.policy.has_role(user, role) {
            Ok(())
        } else {
            Err(EgateError::PermissionDenied(format!(
                "This action requires the {} role.",
                role
            )))
        }
    }

    pub async fn create_event(&self, user: &User, request: CreateEventRequest) -> Result<Event> {
        self.require(user, Role::Admin)?;
        self.catalog.create_event(request, user).await
    }

    pub async fn update_event(&self, user: &User, id: i64, patch: UpdateEventRequest) -> Result<Event> {
        self.require(user, Role::Admin)?;
        let event = self.catalog.update_event(id, patch).await?;
        log_admin_action(user.id, "update_event", Some(&format!("event {}", id)), None);
        Ok(event)
    }

    pub async fn delete_event(&self, user: &User, id: i64) -> Result<()> {
        self.require(user, Role::Admin)?;
        self.catalog.delete_event(id).await?;
        log_admin_action(user.id, "delete_event", Some(&format!("event {}", id)), None);
        Ok(())
    }

    /// Any authenticated user
    pub async fn get_event(&self, id: i64) -> Result<Event> {
        self.catalog.get_event(id).await
    }

    /// Any authenticated user
    pub async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>> {
        self.catalog.list_events(query).await
    }

    pub async fn register(&self, user: &User, event_id: i64) -> Result<RegistrationOutcome> {
        self.require(user, Role::Resident)?;
        self.registrations.register(event_id, user).await
    }

    pub async fn unregister(&self, user: &User, event_id: i64) -> Result<UnregisterOutcome> {
        self.require(user, Role::Resident)?;
        self.registrations.unregister(event_id, user).await
    }

    pub async fn my_registrations(&self, user: &User) -> Result<Vec<RegistrationView>> {
        self.require(user, Role::Resident)?;
        self.registrations.list_mine(user).await
    }

    pub async fn registrants(&self, user: &User, event_id: i64) -> Result<Vec<RegistrationView>> {
        self.require(user, Role::Admin)?;
        self.registrations.list_registrants(event_id).await
    }

    pub async fn mark_attendance(&self, user: &User, request: &MarkAttendanceRequest) -> Result<CheckInOutcome> {
        self.require(user, Role::Admin)?;
        self.attendance.mark_attendance(request, user).await
    }

    pub async fn event_attendance(
        &self,
        user: &User,
        event_id: i64,
        page: PageRequest,
    ) -> Result<Page<AttendanceView>> {
        self.require(user, Role::Admin)?;
        self.attendance.list_for_event(event_id, page).await
    }

    pub async fn all_attendance(&self, user: &User, page: PageRequest) -> Result<Page<AttendanceView>> {
        self.require(user, Role::Admin)?;
        self.attendance.list_all(page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::services::RolePolicy;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service_with(policy: Arc<dyn AccessPolicy>) -> EventLifecycleService {
        let store = Arc::new(MemoryStore::new());
        EventLifecycleService::new(
            EventCatalog::new(store.clone()),
            RegistrationLedger::new(store.clone()),
            AttendanceLedger::new(store.clone(), store),
            policy,
        )
    }

    fn admin() -> User {
        User::new(1, "kapitan", Role::Admin)
    }

    fn resident(id: i64) -> User {
        User::new(id, format!("resident{}", id), Role::Resident)
    }

    fn draft() -> CreateEventRequest {
        CreateEventRequest {
            title: "Barangay Assembly".to_string(),
            category: Some("assembly".to_string()),
            date: Some(Utc::now() + Duration::days(2)),
            venue: "Hall".to_string(),
            ..Default::default()
        }
    }

    /// Counts policy evaluations so tests can see the check ran
    struct CountingPolicy(AtomicUsize);

    impl AccessPolicy for CountingPolicy {
        fn has_role(&self, user: &User, role: Role) -> bool {
            self.0.fetch_add(1, Ordering::SeqCst);
            user.role == role
        }
    }

    #[tokio::test]
    async fn test_roles_are_enforced() {
        let service = service_with(Arc::new(RolePolicy));
        let event = service.create_event(&admin(), draft()).await.unwrap();

        assert_matches!(
            service.create_event(&resident(2), draft()).await,
            Err(EgateError::PermissionDenied(_))
        );
        assert_matches!(
            service.delete_event(&resident(2), event.id).await,
            Err(EgateError::PermissionDenied(_))
        );
        assert_matches!(
            service.register(&admin(), event.id).await,
            Err(EgateError::PermissionDenied(_))
        );
        assert_matches!(
            service.my_registrations(&admin()).await,
            Err(EgateError::PermissionDenied(_))
        );
        assert_matches!(
            service.registrants(&resident(2), event.id).await,
            Err(EgateError::PermissionDenied(_))
        );
        assert_matches!(
            service.mark_attendance(&resident(2), &MarkAttendanceRequest::default()).await,
            Err(EgateError::PermissionDenied(_))
        );
        assert_matches!(
            service.all_attendance(&resident(2), PageRequest { page: 1, page_size: 10 }).await,
            Err(EgateError::PermissionDenied(_))
        );
    }

    #[tokio::test]
    async fn test_policy_runs_before_lookup() {
        let policy = Arc::new(CountingPolicy(AtomicUsize::new(0)));
        let service = service_with(policy.clone());

        // a missing event would be NotFound; the role check wins
        assert_matches!(
            service.update_event(&resident(2), 404, UpdateEventRequest::default()).await,
            Err(EgateError::PermissionDenied(_))
        );
        assert_eq!(policy.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_window_capacity_and_check_in_lock() {
        let service = service_with(Arc::new(RolePolicy));
        let now = Utc::now();
        let request = CreateEventRequest {
            date: Some(now + Duration::hours(48)),
            registration_open: Some(now + Duration::hours(24)),
            registration_close: Some(now + Duration::hours(48)),
            capacity: Some(1),
            ..draft()
        };
        let event = service.create_event(&admin(), request).await.unwrap();

        assert_matches!(
            service.register(&resident(2), event.id).await,
            Err(EgateError::RegistrationNotOpen)
        );

        let patch = UpdateEventRequest {
            registration_open: Some(Some(now - Duration::minutes(1))),
            ..Default::default()
        };
        service.update_event(&admin(), event.id, patch).await.unwrap();

        let a = service.register(&resident(2), event.id).await.unwrap();
        assert!(a.is_created());
        assert_matches!(
            service.register(&resident(3), event.id).await,
            Err(EgateError::CapacityExceeded { capacity: 1 })
        );

        let mark = MarkAttendanceRequest {
            registration_id: Some(a.registration().id),
            ..Default::default()
        };
        assert!(service.mark_attendance(&admin(), &mark).await.unwrap().is_created());
        assert_matches!(
            service.unregister(&resident(2), event.id).await,
            Err(EgateError::AlreadyCheckedIn)
        );
    }
}
