//! User model
//!
//! Accounts are owned by the identity provider; this crate only sees the
//! authenticated user and a read-only directory of residents.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Resident,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Resident => f.write_str("resident"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl User {
    pub fn new(id: i64, username: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            username: username.into(),
            role,
        }
    }
}

/// Directory entry used to resolve check-in selectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Resident {
    pub id: i64,
    pub username: String,
    /// Stable barangay ID printed on the resident's card
    pub profile_id: Uuid,
}
