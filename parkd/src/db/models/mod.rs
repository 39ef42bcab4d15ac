//! Database record structures matching table schemas.
//!
//! Each entity has a `*CreateDBRequest` / `*UpdateDBRequest` pair for
//! writes and a `*DBResponse` struct (deriving [`sqlx::FromRow`]) for
//! reads. API-facing DTOs live in [`crate::api::models`] and convert from
//! these.

pub mod cameras;
pub mod sessions;
pub mod shifts;
pub mod tariffs;
pub mod users;
