//! API types for gate cameras.

use crate::db::models::cameras::CameraDBResponse;
use crate::types::CameraId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which way a camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "camera_direction", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CameraDirection {
    /// Watches the entry lane
    Entry,
    /// Watches the exit lane
    Exit,
}

impl std::fmt::Display for CameraDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraDirection::Entry => write!(f, "entry"),
            CameraDirection::Exit => write!(f, "exit"),
        }
    }
}

/// Request to register a camera
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CameraCreate {
    /// Channel name reported by the camera, e.g. "P4-6"
    pub channel_name: String,
    /// Vendor token identifying the camera channel
    pub channel_token: String,
    pub direction: CameraDirection,
}

/// Request to update a camera; all fields optional
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CameraUpdate {
    pub channel_name: Option<String>,
    pub channel_token: Option<String>,
    pub direction: Option<CameraDirection>,
}

/// A camera as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CameraResponse {
    pub id: CameraId,
    pub channel_name: String,
    pub channel_token: String,
    pub direction: CameraDirection,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CameraDBResponse> for CameraResponse {
    fn from(db: CameraDBResponse) -> Self {
        Self {
            id: db.id,
            channel_name: db.channel_name,
            channel_token: db.channel_token,
            direction: db.direction,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
