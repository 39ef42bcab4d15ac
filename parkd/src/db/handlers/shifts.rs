//! Database repository for operator shifts.

use crate::types::{ShiftId, UserId, abbrev_uuid};
use crate::db::{
    errors::{DbError, Result},
    models::shifts::ShiftDBResponse,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::instrument;

/// Filter for shift reporting
#[derive(Debug, Clone, Default)]
pub struct ShiftFilter {
    /// Scope to a single operator
    pub operator_id: Option<UserId>,
    pub skip: i64,
    pub limit: i64,
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ShiftFilter) {
    builder.push(" WHERE TRUE");
    if let Some(operator_id) = filter.operator_id {
        builder.push(" AND operator_id = ");
        builder.push_bind(operator_id);
    }
}

pub struct Shifts<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Shifts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Open a shift for an operator at login.
    #[instrument(skip(self), fields(operator_id = %abbrev_uuid(&operator_id)), err)]
    pub async fn open(&mut self, operator_id: UserId, park_zone: &str) -> Result<ShiftDBResponse> {
        let shift = sqlx::query_as::<_, ShiftDBResponse>(
            r#"
            INSERT INTO operator_shifts (operator_id, park_zone)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(operator_id)
        .bind(park_zone)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(shift)
    }

    /// The operator's currently open shift, locked for the enclosing
    /// transaction so settlement writes serialize.
    #[instrument(skip(self), fields(operator_id = %abbrev_uuid(&operator_id)), err)]
    pub async fn lock_open_for_operator(&mut self, operator_id: UserId) -> Result<Option<ShiftDBResponse>> {
        let shift = sqlx::query_as::<_, ShiftDBResponse>(
            r#"
            SELECT * FROM operator_shifts
            WHERE operator_id = $1 AND logout_at IS NULL
            ORDER BY id DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(operator_id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(shift)
    }

    /// Close a shift with its settlement total.
    #[instrument(skip(self), fields(shift_id = id), err)]
    pub async fn close(
        &mut self,
        id: ShiftId,
        collected: Decimal,
        logout_at: DateTime<Utc>,
    ) -> Result<ShiftDBResponse> {
        let shift = sqlx::query_as::<_, ShiftDBResponse>(
            r#"
            UPDATE operator_shifts
            SET collected = $2, logout_at = $3
            WHERE id = $1 AND logout_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(collected)
        .bind(logout_at)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(shift)
    }

    /// Shifts for reporting, newest first.
    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    pub async fn list(&mut self, filter: &ShiftFilter) -> Result<Vec<ShiftDBResponse>> {
        let mut builder = QueryBuilder::new("SELECT * FROM operator_shifts");
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY id DESC LIMIT ");
        builder.push_bind(filter.limit);
        builder.push(" OFFSET ");
        builder.push_bind(filter.skip);

        let shifts = builder
            .build_query_as::<ShiftDBResponse>()
            .fetch_all(&mut *self.db)
            .await?;
        Ok(shifts)
    }

    /// Total rows matching the filter, ignoring pagination.
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &ShiftFilter) -> Result<i64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM operator_shifts");
        push_filters(&mut builder, filter);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::models::users::Role, test_utils::create_test_user};
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_list_scopes_to_operator(pool: PgPool) {
        let first = create_test_user(&pool, Role::Operator, "P4").await;
        let second = create_test_user(&pool, Role::Operator, "P6").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Shifts::new(&mut conn);
        repo.open(first.id, "P4").await.unwrap();
        repo.open(second.id, "P6").await.unwrap();

        let all = ShiftFilter {
            operator_id: None,
            skip: 0,
            limit: 10,
        };
        assert_eq!(repo.count(&all).await.unwrap(), 2);

        let scoped = ShiftFilter {
            operator_id: Some(first.id),
            skip: 0,
            limit: 10,
        };
        assert_eq!(repo.count(&scoped).await.unwrap(), 1);
        let shifts = repo.list(&scoped).await.unwrap();
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].operator_id, first.id);
        assert!(shifts[0].logout_at.is_none());
    }
}
