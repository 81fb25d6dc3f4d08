//! Test helpers module
//!
//! Database setup plus builders shared by the integration tests.

#![allow(dead_code)]

pub mod database_helper;
pub mod test_data;

pub use database_helper::*;
pub use test_data::*;
