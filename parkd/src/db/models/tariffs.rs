//! Database models for VIP tariffs.

use crate::types::TariffId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Database request for creating a tariff
#[derive(Debug, Clone)]
pub struct TariffCreateDBRequest {
    pub plate: String,
    pub holder_name: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub price: Decimal,
}

/// Database response for a tariff
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TariffDBResponse {
    pub id: TariffId,
    pub plate: String,
    pub holder_name: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}
