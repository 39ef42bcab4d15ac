//! Live occupancy counter handlers.
//!
//! Counters are in-memory per zone: gate hardware and operator screens
//! adjust them with deltas, and they reset when the zone's operator logs
//! out. They are advisory display state, not ledger data.

use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        occupancy::{OccupancyResponse, OccupancyUpdate},
        users::CurrentUser,
    },
    errors::Error,
};

/// Read the current counters for all zones
#[utoipa::path(
    get,
    path = "/occupancy",
    tag = "occupancy",
    responses(
        (status = 200, description = "Current counters", body = OccupancyResponse),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_occupancy(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Json<OccupancyResponse> {
    Json(OccupancyResponse {
        counts: state.occupancy.snapshot(),
    })
}

/// Adjust a zone's counter by a signed delta
#[utoipa::path(
    put,
    path = "/occupancy",
    request_body = OccupancyUpdate,
    tag = "occupancy",
    responses(
        (status = 200, description = "Counter adjusted", body = OccupancyResponse),
        (status = 400, description = "Invalid zone"),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all, fields(zone = %request.park_zone, delta = request.delta))]
pub async fn update_occupancy(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(request): Json<OccupancyUpdate>,
) -> Result<Json<OccupancyResponse>, Error> {
    if request.park_zone.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "park_zone is required".to_string(),
        });
    }

    state.occupancy.add(&request.park_zone, request.delta);

    Ok(Json(OccupancyResponse {
        counts: state.occupancy.snapshot(),
    }))
}
