//! Middleware module
//!
//! This module contains middleware for request processing

pub mod auth;
pub mod logging;

// Re-export commonly used middleware
pub use auth::{BearerToken, CurrentUser};
pub use logging::{trace_layer, RequestSpan};
