//! Database models for cameras.

use crate::api::models::cameras::CameraDirection;
use crate::types::CameraId;
use chrono::{DateTime, Utc};

/// Database request for creating a camera
#[derive(Debug, Clone)]
pub struct CameraCreateDBRequest {
    pub channel_name: String,
    pub channel_token: String,
    pub direction: CameraDirection,
}

/// Database request for updating a camera
#[derive(Debug, Clone, Default)]
pub struct CameraUpdateDBRequest {
    pub channel_name: Option<String>,
    pub channel_token: Option<String>,
    pub direction: Option<CameraDirection>,
}

/// Database response for a camera
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CameraDBResponse {
    pub id: CameraId,
    pub channel_name: String,
    pub channel_token: String,
    pub direction: CameraDirection,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
