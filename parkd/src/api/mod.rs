//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: axum route handlers for all endpoints
//! - **[`models`]**: request/response data structures
//!
//! All endpoints live under `/api/v1` and are documented with utoipa;
//! the OpenAPI document is served at `/api-docs/openapi.json`.

pub mod handlers;
pub mod models;
