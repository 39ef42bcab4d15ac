//! Database repository for gate cameras.

use crate::types::CameraId;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::cameras::{CameraCreateDBRequest, CameraDBResponse, CameraUpdateDBRequest},
};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing cameras
#[derive(Debug, Clone)]
pub struct CameraFilter {
    pub skip: i64,
    pub limit: i64,
}

pub struct Cameras<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Cameras<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, channel_name), err)]
    pub async fn get_by_channel_name(&mut self, channel_name: &str) -> Result<Option<CameraDBResponse>> {
        let camera =
            sqlx::query_as::<_, CameraDBResponse>("SELECT * FROM cameras WHERE channel_name = $1")
                .bind(channel_name)
                .fetch_optional(&mut *self.db)
                .await?;
        Ok(camera)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Cameras<'c> {
    type CreateRequest = CameraCreateDBRequest;
    type UpdateRequest = CameraUpdateDBRequest;
    type Response = CameraDBResponse;
    type Id = CameraId;
    type Filter = CameraFilter;

    #[instrument(skip(self, request), fields(channel = %request.channel_name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let camera = sqlx::query_as::<_, CameraDBResponse>(
            r#"
            INSERT INTO cameras (channel_name, channel_token, direction)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&request.channel_name)
        .bind(&request.channel_token)
        .bind(request.direction)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(camera)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let camera = sqlx::query_as::<_, CameraDBResponse>("SELECT * FROM cameras WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(camera)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let cameras = sqlx::query_as::<_, CameraDBResponse>(
            "SELECT * FROM cameras ORDER BY channel_name LIMIT $1 OFFSET $2",
        )
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(cameras)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cameras WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let camera = sqlx::query_as::<_, CameraDBResponse>(
            r#"
            UPDATE cameras SET
                channel_name = COALESCE($2, channel_name),
                channel_token = COALESCE($3, channel_token),
                direction = COALESCE($4, direction),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.channel_name)
        .bind(&request.channel_token)
        .bind(request.direction)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(camera)
    }
}
