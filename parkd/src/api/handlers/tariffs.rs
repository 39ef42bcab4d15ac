//! VIP tariff management handlers. Accountant role.
//!
//! Every mutation rebuilds the in-memory VIP plate filter so gate
//! decisions pick up the change without a restart. A failed rebuild is
//! logged and does not fail the mutation; the table remains the source
//! of truth and the next rebuild heals the filter.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    api::models::{
        pagination::Pagination,
        tariffs::{SearchTariffsQuery, TariffCreate, TariffListResponse, TariffResponse},
        users::{CurrentUser, Role},
    },
    db::{
        handlers::{Repository, Tariffs, tariffs::TariffFilter},
        models::tariffs::TariffCreateDBRequest,
    },
    errors::Error,
    types::TariffId,
};

impl From<TariffCreate> for TariffCreateDBRequest {
    fn from(request: TariffCreate) -> Self {
        Self {
            plate: request.plate,
            holder_name: request.holder_name,
            valid_from: request.valid_from,
            valid_until: request.valid_until,
            price: request.price,
        }
    }
}

/// Register a VIP plate
#[utoipa::path(
    post,
    path = "/tariffs",
    request_body = TariffCreate,
    tag = "tariffs",
    responses(
        (status = 201, description = "Tariff created", body = TariffResponse),
        (status = 403, description = "Accountant only"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn create_tariff(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<TariffCreate>,
) -> Result<(axum::http::StatusCode, Json<TariffResponse>), Error> {
    current_user.require_role(Role::Accountant, "create", "tariffs")?;

    if request.plate.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Plate is required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Tariffs::new(&mut conn);
    let created = repo.create(&request.into()).await?;

    if let Err(e) = state.vip.reload_from_db(&state.db).await {
        tracing::warn!("Failed to rebuild VIP filter after tariff change: {e}");
    }

    Ok((axum::http::StatusCode::CREATED, Json(TariffResponse::from(created))))
}

/// List and search tariffs
#[utoipa::path(
    get,
    path = "/tariffs",
    tag = "tariffs",
    params(SearchTariffsQuery, Pagination),
    responses(
        (status = 200, description = "Tariffs", body = TariffListResponse),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn list_tariffs(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SearchTariffsQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<TariffListResponse>, Error> {
    let (skip, limit) = pagination.params();
    let filter = TariffFilter {
        plate: query.plate,
        holder_name: query.holder_name,
        skip,
        limit,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Tariffs::new(&mut conn);

    let total_count = repo.count(&filter).await?;
    let total_price = repo.total_price(&filter).await?;
    let tariffs = repo.list(&filter).await?;

    Ok(Json(TariffListResponse {
        data: tariffs.into_iter().map(TariffResponse::from).collect(),
        total_count,
        total_price,
        skip,
        limit,
    }))
}

/// Get a tariff by ID
#[utoipa::path(
    get,
    path = "/tariffs/{id}",
    tag = "tariffs",
    params(("id" = i64, Path, description = "Tariff ID")),
    responses(
        (status = 200, description = "Tariff", body = TariffResponse),
        (status = 404, description = "Tariff not found"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn get_tariff(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<TariffId>,
) -> Result<Json<TariffResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Tariffs::new(&mut conn);

    let tariff = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "tariff".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(TariffResponse::from(tariff)))
}

/// Update a tariff
#[utoipa::path(
    put,
    path = "/tariffs/{id}",
    request_body = TariffCreate,
    tag = "tariffs",
    params(("id" = i64, Path, description = "Tariff ID")),
    responses(
        (status = 200, description = "Tariff updated", body = TariffResponse),
        (status = 403, description = "Accountant only"),
        (status = 404, description = "Tariff not found"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn update_tariff(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<TariffId>,
    Json(request): Json<TariffCreate>,
) -> Result<Json<TariffResponse>, Error> {
    current_user.require_role(Role::Accountant, "update", "tariffs")?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Tariffs::new(&mut conn);
    let updated = repo.update(id, &request.into()).await?;

    if let Err(e) = state.vip.reload_from_db(&state.db).await {
        tracing::warn!("Failed to rebuild VIP filter after tariff change: {e}");
    }

    Ok(Json(TariffResponse::from(updated)))
}

/// Delete a tariff
#[utoipa::path(
    delete,
    path = "/tariffs/{id}",
    tag = "tariffs",
    params(("id" = i64, Path, description = "Tariff ID")),
    responses(
        (status = 204, description = "Tariff deleted"),
        (status = 403, description = "Accountant only"),
        (status = 404, description = "Tariff not found"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn delete_tariff(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<TariffId>,
) -> Result<axum::http::StatusCode, Error> {
    current_user.require_role(Role::Accountant, "delete", "tariffs")?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Tariffs::new(&mut conn);

    if !repo.delete(id).await? {
        return Err(Error::NotFound {
            resource: "tariff".to_string(),
            id: id.to_string(),
        });
    }

    if let Err(e) = state.vip.reload_from_db(&state.db).await {
        tracing::warn!("Failed to rebuild VIP filter after tariff change: {e}");
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}
