//! Services module
//!
//! This module contains business logic services

pub mod attendance;
pub mod auth;
pub mod catalog;
pub mod lifecycle;
pub mod registration;

// Re-export commonly used services
pub use attendance::AttendanceLedger;
pub use auth::{AccessPolicy, Claims, IdentityProvider, JwtIdentityProvider, RolePolicy};
pub use catalog::{EventCatalog, EventDraft, ValidEvent};
pub use lifecycle::EventLifecycleService;
pub use registration::RegistrationLedger;

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::database::{EventStore, ResidentDirectory};
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub lifecycle: EventLifecycleService,
    pub identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn EventStore>,
}

impl ServiceFactory {
    /// Wire every service over one store that also serves as the resident directory
    pub fn new<S>(store: Arc<S>, settings: &Settings) -> Self
    where
        S: EventStore + ResidentDirectory + 'static,
    {
        let identity: Arc<dyn IdentityProvider> = Arc::new(JwtIdentityProvider::new(&settings.auth));
        Self::with_identity(store, identity, Arc::new(RolePolicy))
    }

    /// Same as [`ServiceFactory::new`] with explicit collaborators
    pub fn with_identity<S>(
        store: Arc<S>,
        identity: Arc<dyn IdentityProvider>,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self
    where
        S: EventStore + ResidentDirectory + 'static,
    {
        let events: Arc<dyn EventStore> = store.clone();
        let directory: Arc<dyn ResidentDirectory> = store;

        let lifecycle = EventLifecycleService::new(
            EventCatalog::new(events.clone()),
            RegistrationLedger::new(events.clone()),
            AttendanceLedger::new(events.clone(), directory),
            policy,
        );

        Self {
            lifecycle,
            identity,
            store: events,
        }
    }

    /// Health check for the backing store
    pub async fn health_check(&self) -> Result<()> {
        self.store.ping().await
    }
}
