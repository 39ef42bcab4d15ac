//! API types for VIP tariffs.

use crate::db::models::tariffs::TariffDBResponse;
use crate::types::TariffId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Request to register a VIP plate
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TariffCreate {
    pub plate: String,
    pub holder_name: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    #[schema(value_type = f64)]
    pub price: Decimal,
}

/// A tariff as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TariffResponse {
    pub id: TariffId,
    pub plate: String,
    pub holder_name: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<TariffDBResponse> for TariffResponse {
    fn from(db: TariffDBResponse) -> Self {
        Self {
            id: db.id,
            plate: db.plate,
            holder_name: db.holder_name,
            valid_from: db.valid_from,
            valid_until: db.valid_until,
            price: db.price,
            created_at: db.created_at,
        }
    }
}

/// Paginated tariff listing with the summed price of every match
#[derive(Debug, Serialize, ToSchema)]
pub struct TariffListResponse {
    pub data: Vec<TariffResponse>,
    pub total_count: i64,
    /// Sum of `price` over all matches, not just this page
    #[schema(value_type = f64)]
    pub total_price: Decimal,
    pub skip: i64,
    pub limit: i64,
}

/// Query parameters for searching tariffs
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchTariffsQuery {
    /// Substring match on the plate
    pub plate: Option<String>,
    /// Substring match on the holder's name
    pub holder_name: Option<String>,
}
