//! Database repository for VIP tariffs.

use crate::types::TariffId;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::tariffs::{TariffCreateDBRequest, TariffDBResponse},
};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::instrument;

/// Filter for listing and searching tariffs
#[derive(Debug, Clone, Default)]
pub struct TariffFilter {
    /// Substring match on the plate
    pub plate: Option<String>,
    /// Substring match on the holder's name
    pub holder_name: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

pub struct Tariffs<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Tariffs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// All VIP plates, for rebuilding the membership filter.
    #[instrument(skip(self), err)]
    pub async fn all_plates(&mut self) -> Result<Vec<String>> {
        let plates = sqlx::query_scalar::<_, String>("SELECT plate FROM tariffs")
            .fetch_all(&mut *self.db)
            .await?;
        Ok(plates)
    }

    /// Sum of prices over all rows matching the filter, ignoring
    /// pagination.
    #[instrument(skip(self, filter), err)]
    pub async fn total_price(&mut self, filter: &TariffFilter) -> Result<rust_decimal::Decimal> {
        let mut builder = QueryBuilder::new("SELECT COALESCE(SUM(price), 0) FROM tariffs");
        push_filters(&mut builder, filter);

        let total: rust_decimal::Decimal = builder
            .build_query_scalar()
            .fetch_one(&mut *self.db)
            .await?;
        Ok(total)
    }

    /// Total rows matching the filter, ignoring pagination.
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &TariffFilter) -> Result<i64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM tariffs");
        push_filters(&mut builder, filter);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &TariffFilter) {
    builder.push(" WHERE TRUE");
    if let Some(plate) = &filter.plate {
        builder.push(" AND plate ILIKE ");
        builder.push_bind(format!("%{plate}%"));
    }
    if let Some(holder) = &filter.holder_name {
        builder.push(" AND holder_name ILIKE ");
        builder.push_bind(format!("%{holder}%"));
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Tariffs<'c> {
    type CreateRequest = TariffCreateDBRequest;
    type UpdateRequest = TariffCreateDBRequest;
    type Response = TariffDBResponse;
    type Id = TariffId;
    type Filter = TariffFilter;

    #[instrument(skip(self, request), fields(plate = %request.plate), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let tariff = sqlx::query_as::<_, TariffDBResponse>(
            r#"
            INSERT INTO tariffs (plate, holder_name, valid_from, valid_until, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&request.plate)
        .bind(&request.holder_name)
        .bind(request.valid_from)
        .bind(request.valid_until)
        .bind(request.price)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(tariff)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let tariff = sqlx::query_as::<_, TariffDBResponse>("SELECT * FROM tariffs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(tariff)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut builder = QueryBuilder::new("SELECT * FROM tariffs");
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY id DESC LIMIT ");
        builder.push_bind(filter.limit);
        builder.push(" OFFSET ");
        builder.push_bind(filter.skip);

        let tariffs = builder
            .build_query_as::<TariffDBResponse>()
            .fetch_all(&mut *self.db)
            .await?;
        Ok(tariffs)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tariffs WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(plate = %request.plate), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let tariff = sqlx::query_as::<_, TariffDBResponse>(
            r#"
            UPDATE tariffs SET
                plate = $2,
                holder_name = $3,
                valid_from = $4,
                valid_until = $5,
                price = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.plate)
        .bind(&request.holder_name)
        .bind(request.valid_from)
        .bind(request.valid_until)
        .bind(request.price)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(tariff)
    }
}
