//! Session query and settlement handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    api::models::{
        pagination::{PaginatedResponse, Pagination},
        sessions::{
            ListSessionsQuery, SessionResponse, SettlementRequest, settlement_fee,
        },
        users::{CurrentUser, Role},
    },
    db::{
        handlers::Sessions,
        models::sessions::{SessionFilter, SessionSettleDBRequest},
    },
    errors::Error,
    types::SessionId,
};

/// Sessions outside the caller's zone are invisible to operators;
/// accountants and admins see everything.
fn zone_scope(current_user: &CurrentUser) -> Option<String> {
    match current_user.role {
        Role::Operator => Some(current_user.park_zone.clone()),
        Role::Admin | Role::Accountant => None,
    }
}

/// List and search vehicle sessions
#[utoipa::path(
    get,
    path = "/sessions",
    tag = "sessions",
    params(ListSessionsQuery, Pagination),
    responses(
        (status = 200, description = "Sessions", body = PaginatedResponse<SessionResponse>),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn list_sessions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListSessionsQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<SessionResponse>>, Error> {
    let (skip, limit) = pagination.params();
    let filter = SessionFilter {
        plate: query.plate,
        entered_on: query.entered_on,
        exited_on: query.exited_on,
        status: query.status,
        park_zone: zone_scope(&current_user),
        skip,
        limit,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Sessions::new(&mut conn);

    let total_count = repo.count(&filter).await?;
    let sessions = repo.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        sessions.into_iter().map(SessionResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

/// Get a single session by ID
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "sessions",
    params(("id" = i64, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session", body = SessionResponse),
        (status = 404, description = "Session not found"),
    )
)]
#[tracing::instrument(skip_all, fields(session_id = id))]
pub async fn get_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Sessions::new(&mut conn);

    let session = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "vehicle session".to_string(),
        id: id.to_string(),
    })?;

    if let Some(zone) = zone_scope(&current_user) {
        if session.park_zone != zone {
            return Err(Error::Forbidden {
                action: "read".to_string(),
                resource: format!("session in zone {}", session.park_zone),
            });
        }
    }

    Ok(Json(SessionResponse::from(session)))
}

/// Confirm payment (or waive the fee) for a pending session.
///
/// The default reason keeps the computed fee; any other reason zeroes it
/// as an operator-authorized waiver. The session moves to `exited` and is
/// attributed to the confirming cashier for later shift settlement.
#[utoipa::path(
    put,
    path = "/sessions/{plate}/settlement",
    request_body = SettlementRequest,
    tag = "sessions",
    params(("plate" = String, Path, description = "Vehicle plate")),
    responses(
        (status = 200, description = "Session settled", body = SessionResponse),
        (status = 400, description = "Session already exited"),
        (status = 403, description = "Caller is not an operator"),
        (status = 404, description = "No session for this plate"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id, %plate))]
pub async fn settle_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(plate): Path<String>,
    Json(request): Json<SettlementRequest>,
) -> Result<Json<SessionResponse>, Error> {
    current_user.require_role(Role::Operator, "settle", "sessions")?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Sessions::new(&mut tx);

    let current = repo
        .lock_latest_by_plate(&plate)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "vehicle session".to_string(),
            id: plate.clone(),
        })?;

    if !current.status.can_settle() {
        return Err(Error::BadRequest {
            message: "Vehicle already exited".to_string(),
        });
    }

    let reason = request.reason().to_string();
    let fee = settlement_fee(&reason, current.fee);

    let session = repo
        .apply_settlement(
            current.id,
            current.version,
            &SessionSettleDBRequest {
                reason,
                fee,
                cashier_id: current_user.id,
            },
        )
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    tracing::info!(session_id = session.id, %fee, "session settled");

    Ok(Json(SessionResponse::from(session)))
}
