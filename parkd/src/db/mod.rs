//! Database layer for data persistence and access.
//!
//! Built on SQLx with PostgreSQL, following the repository pattern:
//! API handlers call repositories in [`handlers`], which run queries and
//! return the record types in [`models`]. Errors are categorized in
//! [`errors`] before being mapped to HTTP responses.

pub mod errors;
pub mod handlers;
pub mod models;
