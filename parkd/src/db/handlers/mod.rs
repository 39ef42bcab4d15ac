//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection or transaction, provides
//! strongly-typed operations, and returns the record types from
//! [`crate::db::models`]. CRUD-shaped entities implement the
//! [`Repository`] trait; sessions and shifts expose named lifecycle
//! operations instead.

pub mod cameras;
pub mod repository;
pub mod sessions;
pub mod shifts;
pub mod tariffs;
pub mod users;

pub use cameras::Cameras;
pub use repository::Repository;
pub use sessions::Sessions;
pub use shifts::Shifts;
pub use tariffs::Tariffs;
pub use users::Users;
