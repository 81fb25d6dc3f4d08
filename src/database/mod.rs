//! Database module
//!
//! Storage traits plus the Postgres and in-memory implementations

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod service;
pub mod store;

// Re-export commonly used database components
pub use connection::{create_pool, health_check, run_migrations, DatabaseConfig, DatabasePool};
pub use memory::MemoryStore;
pub use repositories::{AttendanceRepository, EventRepository, RegistrationRepository, ResidentRepository};
pub use service::PgStore;
pub use store::{EventStore, ResidentDirectory};
