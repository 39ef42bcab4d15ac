//! Database repository for vehicle sessions.
//!
//! Sessions do not follow the generic CRUD shape: their writes are
//! lifecycle transitions guarded by row locks and a version column, so the
//! repository exposes named operations instead of the [`Repository`]
//! trait.
//!
//! [`Repository`]: crate::db::handlers::repository::Repository

use crate::types::SessionId;
use crate::{
    db::{
        errors::{DbError, Result},
        models::sessions::{
            SessionCreateDBRequest, SessionDBResponse, SessionExitDBRequest, SessionFilter,
            SessionSettleDBRequest,
        },
    },
    types::UserId,
};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::instrument;

pub struct Sessions<'c> {
    db: &'c mut PgConnection,
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &SessionFilter) {
    builder.push(" WHERE TRUE");
    if let Some(plate) = &filter.plate {
        builder.push(" AND plate ILIKE ");
        builder.push_bind(format!("%{plate}%"));
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
    if let Some(zone) = &filter.park_zone {
        builder.push(" AND park_zone = ");
        builder.push_bind(zone.clone());
    }
    if let Some(day) = filter.entered_on {
        builder.push(" AND entered_at::date = ");
        builder.push_bind(day);
    }
    if let Some(day) = filter.exited_on {
        builder.push(" AND exited_at::date = ");
        builder.push_bind(day);
    }
}

impl<'c> Sessions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Create a session from an entry event. The partial unique index on
    /// open sessions rejects a second entry for the same plate.
    #[instrument(skip(self, request), fields(plate = %request.plate, zone = %request.park_zone), err)]
    pub async fn create_entry(&mut self, request: &SessionCreateDBRequest) -> Result<SessionDBResponse> {
        let session = sqlx::query_as::<_, SessionDBResponse>(
            r#"
            INSERT INTO vehicle_sessions (plate, park_zone, status, image_ref, reason)
            VALUES ($1, $2, 'inside', $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.plate)
        .bind(&request.park_zone)
        .bind(&request.image_ref)
        .bind(&request.reason)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(session)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: SessionId) -> Result<Option<SessionDBResponse>> {
        let session =
            sqlx::query_as::<_, SessionDBResponse>("SELECT * FROM vehicle_sessions WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *self.db)
                .await?;
        Ok(session)
    }

    /// Latest open (inside or pending) session for a plate, if any.
    #[instrument(skip(self, plate), err)]
    pub async fn find_open_by_plate(&mut self, plate: &str) -> Result<Option<SessionDBResponse>> {
        let session = sqlx::query_as::<_, SessionDBResponse>(
            r#"
            SELECT * FROM vehicle_sessions
            WHERE plate = $1 AND status IN ('inside', 'pending')
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(plate)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(session)
    }

    /// Latest session for a plate, locked for the rest of the enclosing
    /// transaction. Serializes concurrent exit and settlement events for
    /// the same vehicle.
    #[instrument(skip(self, plate), err)]
    pub async fn lock_latest_by_plate(&mut self, plate: &str) -> Result<Option<SessionDBResponse>> {
        let session = sqlx::query_as::<_, SessionDBResponse>(
            r#"
            SELECT * FROM vehicle_sessions
            WHERE plate = $1
            ORDER BY id DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(plate)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(session)
    }

    /// Move a session to `pending` with the computed duration and fee.
    ///
    /// Guarded by the version read earlier in the same transaction; a
    /// stale version means another writer got there first.
    #[instrument(skip(self, request), fields(session_id = id), err)]
    pub async fn apply_exit(
        &mut self,
        id: SessionId,
        version: i64,
        request: &SessionExitDBRequest,
    ) -> Result<SessionDBResponse> {
        let session = sqlx::query_as::<_, SessionDBResponse>(
            r#"
            UPDATE vehicle_sessions SET
                status = 'pending',
                exited_at = $3,
                duration_minutes = $4,
                fee = $5,
                reason = $6,
                camera_channel = $7,
                camera_token = $8,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(version)
        .bind(request.exited_at)
        .bind(request.duration_minutes)
        .bind(request.fee)
        .bind(&request.reason)
        .bind(&request.camera_channel)
        .bind(&request.camera_token)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(session)
    }

    /// Move a session to `exited` on cashier confirmation. The `settled`
    /// flag stays false until the operator's shift is closed.
    #[instrument(skip(self, request), fields(session_id = id), err)]
    pub async fn apply_settlement(
        &mut self,
        id: SessionId,
        version: i64,
        request: &SessionSettleDBRequest,
    ) -> Result<SessionDBResponse> {
        let session = sqlx::query_as::<_, SessionDBResponse>(
            r#"
            UPDATE vehicle_sessions SET
                status = 'exited',
                reason = $3,
                fee = $4,
                cashier_id = $5,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(version)
        .bind(&request.reason)
        .bind(request.fee)
        .bind(request.cashier_id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(session)
    }

    /// Sessions confirmed by this operator that have not yet been rolled
    /// into a shift settlement, locked for the enclosing transaction.
    #[instrument(skip(self), err)]
    pub async fn lock_unsettled_by_cashier(&mut self, operator_id: UserId) -> Result<Vec<SessionDBResponse>> {
        let sessions = sqlx::query_as::<_, SessionDBResponse>(
            r#"
            SELECT * FROM vehicle_sessions
            WHERE cashier_id = $1 AND settled = FALSE
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(operator_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(sessions)
    }

    /// Mark all of an operator's unsettled sessions as settled. Returns
    /// the number of rows updated.
    #[instrument(skip(self), err)]
    pub async fn mark_settled(&mut self, operator_id: UserId) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE vehicle_sessions
            SET settled = TRUE, version = version + 1
            WHERE cashier_id = $1 AND settled = FALSE
            "#,
        )
        .bind(operator_id)
        .execute(&mut *self.db)
        .await?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    pub async fn list(&mut self, filter: &SessionFilter) -> Result<Vec<SessionDBResponse>> {
        let mut builder = QueryBuilder::new("SELECT * FROM vehicle_sessions");
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY id DESC LIMIT ");
        builder.push_bind(filter.limit);
        builder.push(" OFFSET ");
        builder.push_bind(filter.skip);

        let sessions = builder
            .build_query_as::<SessionDBResponse>()
            .fetch_all(&mut *self.db)
            .await?;
        Ok(sessions)
    }

    /// Total rows matching the filter, ignoring pagination.
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &SessionFilter) -> Result<i64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM vehicle_sessions");
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
    use crate::api::models::sessions::{
        REASON_AWAITING_PAYMENT, REASON_ENTRY, SessionStatus,
    };
    use chrono::Utc;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    fn entry_request(plate: &str) -> SessionCreateDBRequest {
        SessionCreateDBRequest {
            plate: plate.to_string(),
            park_zone: "P4".to_string(),
            image_ref: "testPhoto.png".to_string(),
            reason: REASON_ENTRY.to_string(),
        }
    }

    fn exit_request(fee: Decimal) -> SessionExitDBRequest {
        SessionExitDBRequest {
            exited_at: Utc::now(),
            duration_minutes: 90,
            fee,
            reason: REASON_AWAITING_PAYMENT.to_string(),
            camera_channel: "P4-2".to_string(),
            camera_token: None,
        }
    }

    #[sqlx::test]
    async fn test_second_entry_for_open_plate_is_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Sessions::new(&mut conn);

        let first = repo.create_entry(&entry_request("BE5084AG")).await.unwrap();

        let err = repo.create_entry(&entry_request("BE5084AG")).await.unwrap_err();
        match err {
            DbError::UniqueViolation { constraint, .. } => {
                assert!(constraint.unwrap_or_default().contains("open_plate"));
            }
            other => panic!("expected unique violation, got {other:?}"),
        }

        // The open session is untouched by the rejected insert
        let unchanged = repo.get_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, SessionStatus::Inside);
        assert_eq!(unchanged.version, first.version);
        assert_eq!(unchanged.entered_at, first.entered_at);
    }

    #[sqlx::test]
    async fn test_exit_moves_session_to_pending(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Sessions::new(&mut conn);

        let session = repo.create_entry(&entry_request("AH1234BC")).await.unwrap();

        let updated = repo
            .apply_exit(session.id, session.version, &exit_request(Decimal::TWO))
            .await
            .unwrap();

        assert_eq!(updated.status, SessionStatus::Pending);
        assert_eq!(updated.fee, Some(Decimal::TWO));
        assert_eq!(updated.duration_minutes, Some(90));
        assert!(updated.exited_at.is_some());
        assert_eq!(updated.version, session.version + 1);
    }

    #[sqlx::test]
    async fn test_exit_with_stale_version_is_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Sessions::new(&mut conn);

        let session = repo.create_entry(&entry_request("AC7777EE")).await.unwrap();
        repo.apply_exit(session.id, session.version, &exit_request(Decimal::TWO))
            .await
            .unwrap();

        // Another writer already advanced the row
        let err = repo
            .apply_exit(session.id, session.version, &exit_request(Decimal::TWO))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }
}
