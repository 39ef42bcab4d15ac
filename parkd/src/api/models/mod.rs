//! API request and response types.
//!
//! These are the wire-facing DTOs; they convert from the database models
//! in [`crate::db::models`] and never expose sensitive columns.

pub mod auth;
pub mod cameras;
pub mod occupancy;
pub mod pagination;
pub mod sessions;
pub mod shifts;
pub mod tariffs;
pub mod users;
