//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod attendance;
pub mod event;
pub mod page;
pub mod registration;
pub mod user;

// Re-export commonly used models
pub use attendance::{AttendanceSelector, AttendanceView, CheckInOutcome, EventAttendance, MarkAttendanceRequest};
pub use event::{CreateEventRequest, Event, EventCategory, EventOrdering, EventQuery, EventRow, EventStatus, NewEvent, UpdateEventRequest};
pub use page::{Page, PageParams, PageRequest};
pub use registration::{EventRegistration, RegistrationOutcome, RegistrationView, UnregisterOutcome};
pub use user::{Resident, Role, User};
