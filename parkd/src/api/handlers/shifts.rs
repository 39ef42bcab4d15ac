//! Shift reporting handlers. Accountant role.
//!
//! Reconciliation reads: which operators held shifts, when, and how much
//! each settled on logout. Shifts are opened and closed by the
//! authentication handlers, never through this surface.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState,
    api::models::{
        pagination::{PaginatedResponse, Pagination},
        shifts::{ListShiftsQuery, ShiftResponse},
        users::{CurrentUser, Role},
    },
    db::handlers::{Shifts, shifts::ShiftFilter},
    errors::Error,
};

/// List operator shifts
#[utoipa::path(
    get,
    path = "/shifts",
    tag = "shifts",
    params(ListShiftsQuery, Pagination),
    responses(
        (status = 200, description = "Shifts", body = PaginatedResponse<ShiftResponse>),
        (status = 403, description = "Accountant only"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn list_shifts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListShiftsQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<ShiftResponse>>, Error> {
    current_user.require_role(Role::Accountant, "list", "shifts")?;

    let (skip, limit) = pagination.params();
    let filter = ShiftFilter {
        operator_id: query.operator_id,
        skip,
        limit,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Shifts::new(&mut conn);

    let total_count = repo.count(&filter).await?;
    let shifts = repo.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        shifts.into_iter().map(ShiftResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}
