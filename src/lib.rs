//! E-Gate events backend
//!
//! Barangay event lifecycle and attendance service. Admins publish events,
//! residents register for them and admins check residents in at the venue.
//! This library provides the catalog, registration and attendance ledgers,
//! their storage backends and the HTTP surface over them.

pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{EgateError, Result};

// Re-export main components for easy access
pub use database::{EventStore, MemoryStore, PgStore, ResidentDirectory};
pub use handlers::{create_router, AppState};
pub use services::{EventLifecycleService, ServiceFactory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
