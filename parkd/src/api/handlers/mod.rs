//! HTTP request handlers for all API endpoints.
//!
//! Each handler validates the request, checks the caller's role, runs the
//! business logic through the repositories in [`crate::db::handlers`], and
//! serializes the response.
//!
//! # Handler Modules
//!
//! - [`auth`]: Registration, login, logout (with shift settlement), current user
//! - [`camera_events`]: Vehicle entry and exit events from the gate cameras
//! - [`cameras`]: Camera registry administration
//! - [`occupancy`]: Live per-zone occupancy counters
//! - [`probes`]: Health checks
//! - [`sessions`]: Session queries and cashier settlement
//! - [`shifts`]: Operator shift reporting
//! - [`tariffs`]: VIP tariff administration
//! - [`users`]: Staff user administration
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which converts to the
//! appropriate HTTP status code and JSON error body.

pub mod auth;
pub mod camera_events;
pub mod cameras;
pub mod occupancy;
pub mod probes;
pub mod sessions;
pub mod shifts;
pub mod tariffs;
pub mod users;
