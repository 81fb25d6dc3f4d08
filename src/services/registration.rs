//! Registration ledger

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::database::EventStore;
use crate::models::{RegistrationOutcome, RegistrationView, UnregisterOutcome, User};
use crate::utils::errors::{EgateError, Result};
use crate::utils::logging::log_event_action;

#[derive(Clone)]
pub struct RegistrationLedger {
    store: Arc<dyn EventStore>,
}

impl RegistrationLedger {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Register `resident`; a repeated call returns the existing registration
    pub async fn register(&self, event_id: i64, resident: &User) -> Result<RegistrationOutcome> {
        let outcome = self.store.register(event_id, resident.id, Utc::now()).await?;

        match &outcome {
            RegistrationOutcome::Created(registration) => log_event_action(
                event_id,
                "register",
                resident.id,
                Some(&format!("registration {}", registration.id)),
            ),
            RegistrationOutcome::AlreadyRegistered(_) => {
                debug!(event_id, resident_id = resident.id, "Resident already registered")
            }
        }
        Ok(outcome)
    }

    pub async fn unregister(&self, event_id: i64, resident: &User) -> Result<UnregisterOutcome> {
        let outcome = self.store.unregister(event_id, resident.id, Utc::now()).await?;

        if outcome == UnregisterOutcome::Removed {
            log_event_action(event_id, "unregister", resident.id, None);
        }
        Ok(outcome)
    }

    /// The resident's registrations, soonest event first
    pub async fn list_mine(&self, resident: &User) -> Result<Vec<RegistrationView>> {
        self.store.registrations_for_resident(resident.id).await
    }

    /// Everyone registered for an event, in registration order
    pub async fn list_registrants(&self, event_id: i64) -> Result<Vec<RegistrationView>> {
        if self.store.find_event(event_id).await?.is_none() {
            return Err(EgateError::EventNotFound { event_id });
        }

        let registrants = self.store.registrations_for_event(event_id).await?;
        info!(event_id, count = registrants.len(), "Listed registrants");
        Ok(registrants)
    }
}
