//! API types for operator shifts.

use crate::db::models::shifts::ShiftDBResponse;
use crate::types::{ShiftId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// An operator shift as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShiftResponse {
    pub id: ShiftId,
    #[schema(value_type = Uuid)]
    pub operator_id: UserId,
    pub park_zone: String,
    pub login_at: DateTime<Utc>,
    pub logout_at: Option<DateTime<Utc>>,
    /// Total settled on logout
    #[schema(value_type = f64)]
    pub collected: Decimal,
}

/// Query parameters for shift reporting
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListShiftsQuery {
    /// Only shifts held by this operator
    #[param(value_type = Option<Uuid>)]
    pub operator_id: Option<UserId>,
}

impl From<ShiftDBResponse> for ShiftResponse {
    fn from(db: ShiftDBResponse) -> Self {
        Self {
            id: db.id,
            operator_id: db.operator_id,
            park_zone: db.park_zone,
            login_at: db.login_at,
            logout_at: db.logout_at,
            collected: db.collected,
        }
    }
}
