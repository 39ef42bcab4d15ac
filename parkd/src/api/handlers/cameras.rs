//! Camera registry handlers. Admin only.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    api::models::{
        cameras::{CameraCreate, CameraResponse, CameraUpdate},
        pagination::Pagination,
        users::CurrentUser,
    },
    db::{
        handlers::{Cameras, Repository, cameras::CameraFilter},
        models::cameras::{CameraCreateDBRequest, CameraUpdateDBRequest},
    },
    errors::Error,
    types::CameraId,
};

/// Register a camera
#[utoipa::path(
    post,
    path = "/cameras",
    request_body = CameraCreate,
    tag = "cameras",
    responses(
        (status = 201, description = "Camera registered", body = CameraResponse),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Channel name already registered"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn create_camera(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CameraCreate>,
) -> Result<(axum::http::StatusCode, Json<CameraResponse>), Error> {
    current_user.require_admin("create", "cameras")?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Cameras::new(&mut conn);

    let created = repo
        .create(&CameraCreateDBRequest {
            channel_name: request.channel_name,
            channel_token: request.channel_token,
            direction: request.direction,
        })
        .await?;

    Ok((axum::http::StatusCode::CREATED, Json(CameraResponse::from(created))))
}

/// List cameras
#[utoipa::path(
    get,
    path = "/cameras",
    tag = "cameras",
    params(Pagination),
    responses(
        (status = 200, description = "Cameras", body = Vec<CameraResponse>),
        (status = 403, description = "Admin only"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn list_cameras(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<CameraResponse>>, Error> {
    current_user.require_admin("list", "cameras")?;

    let (skip, limit) = pagination.params();
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Cameras::new(&mut conn);

    let cameras = repo.list(&CameraFilter { skip, limit }).await?;
    Ok(Json(cameras.into_iter().map(CameraResponse::from).collect()))
}

/// Update a camera
#[utoipa::path(
    put,
    path = "/cameras/{id}",
    request_body = CameraUpdate,
    tag = "cameras",
    params(("id" = i64, Path, description = "Camera ID")),
    responses(
        (status = 200, description = "Camera updated", body = CameraResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Camera not found"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn update_camera(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CameraId>,
    Json(request): Json<CameraUpdate>,
) -> Result<Json<CameraResponse>, Error> {
    current_user.require_admin("update", "cameras")?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Cameras::new(&mut conn);

    let updated = repo
        .update(
            id,
            &CameraUpdateDBRequest {
                channel_name: request.channel_name,
                channel_token: request.channel_token,
                direction: request.direction,
            },
        )
        .await?;

    Ok(Json(CameraResponse::from(updated)))
}

/// Remove a camera
#[utoipa::path(
    delete,
    path = "/cameras/{id}",
    tag = "cameras",
    params(("id" = i64, Path, description = "Camera ID")),
    responses(
        (status = 204, description = "Camera removed"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Camera not found"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn delete_camera(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CameraId>,
) -> Result<axum::http::StatusCode, Error> {
    current_user.require_admin("delete", "cameras")?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Cameras::new(&mut conn);

    if !repo.delete(id).await? {
        return Err(Error::NotFound {
            resource: "camera".to_string(),
            id: id.to_string(),
        });
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}
