//! Database models for vehicle parking sessions.

use crate::api::models::sessions::SessionStatus;
use crate::types::{SessionId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Database request for creating a session on an entry event
#[derive(Debug, Clone)]
pub struct SessionCreateDBRequest {
    pub plate: String,
    pub park_zone: String,
    pub image_ref: String,
    pub reason: String,
}

/// Fields written when an exit event moves a session to `pending`.
#[derive(Debug, Clone)]
pub struct SessionExitDBRequest {
    pub exited_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub fee: Decimal,
    pub reason: String,
    pub camera_channel: String,
    pub camera_token: Option<String>,
}

/// Fields written when a cashier settles a `pending` session.
#[derive(Debug, Clone)]
pub struct SessionSettleDBRequest {
    pub reason: String,
    pub fee: Decimal,
    pub cashier_id: UserId,
}

/// Database response for a vehicle session
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionDBResponse {
    pub id: SessionId,
    pub plate: String,
    pub park_zone: String,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub duration_minutes: Option<i64>,
    pub fee: Option<Decimal>,
    pub settled: bool,
    pub cashier_id: Option<UserId>,
    pub reason: String,
    pub image_ref: String,
    pub camera_channel: Option<String>,
    pub camera_token: Option<String>,
    pub version: i64,
}

/// Filters for session listing and search.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    /// Substring match on the plate
    pub plate: Option<String>,
    /// Sessions entered on this calendar day
    pub entered_on: Option<chrono::NaiveDate>,
    /// Sessions exited on this calendar day
    pub exited_on: Option<chrono::NaiveDate>,
    pub status: Option<SessionStatus>,
    /// Scope to a park zone (from the principal's assignment)
    pub park_zone: Option<String>,
    pub skip: i64,
    pub limit: i64,
}
