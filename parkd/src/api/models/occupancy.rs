//! API types for live occupancy counters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Adjust the live counter of a park zone.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OccupancyUpdate {
    /// Park zone, e.g. "P4"
    pub park_zone: String,
    /// Signed adjustment; negative frees spots
    pub delta: i64,
}

/// Current counters for all zones
#[derive(Debug, Serialize, ToSchema)]
pub struct OccupancyResponse {
    pub counts: HashMap<String, i64>,
}
