//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod attendance;
pub mod event;
pub mod registration;
pub mod resident;

// Re-export repositories
pub use attendance::AttendanceRepository;
pub use event::EventRepository;
pub use registration::RegistrationRepository;
pub use resident::ResidentRepository;
