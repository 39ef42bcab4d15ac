//! Authentication handlers: register, login, logout, current user.
//!
//! Operator logins open a shift; operator logouts settle it. Settlement
//! runs in a single transaction so the ledger cannot end up half-marked.

use axum::{Json, extract::State};
use chrono::Utc;

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, LoginRequest, LoginResponse, LogoutBody, LogoutResponse},
        shifts::ShiftResponse,
        users::{CurrentUser, Role, UserCreate, UserResponse},
    },
    auth::{password, session},
    db::{
        handlers::{Repository, Sessions, Shifts, Users},
        models::{shifts::settlement_total, users::UserCreateDBRequest},
    },
    errors::Error,
    notifications::ParkEvent,
};

/// Register a new user account.
///
/// The account is created inactive; an admin activates it and assigns the
/// final role.
#[utoipa::path(
    post,
    path = "/authentication/register",
    request_body = UserCreate,
    tag = "authentication",
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username already taken"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<UserCreate>,
) -> Result<(axum::http::StatusCode, Json<UserResponse>), Error> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(Error::BadRequest {
            message: "Username and password are required".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid stalling the runtime
    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let create_request = UserCreateDBRequest {
        username: request.username,
        first_name: request.first_name,
        last_name: request.last_name,
        password_hash,
        role: request.role,
        park_zone: request.park_zone,
        is_active: false,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);
    let created = user_repo.create(&create_request).await?;

    Ok((axum::http::StatusCode::CREATED, Json(UserResponse::from(created))))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/authentication/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<LoginResponse, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    let user = user_repo
        .get_by_username(&request.username)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some("Invalid username or password".to_string()),
        })?;

    if !user.is_active {
        return Err(Error::Unauthenticated {
            message: Some("Account is not active".to_string()),
        });
    }

    // Verify password on a blocking thread
    let password = request.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Invalid username or password".to_string()),
        });
    }

    let current_user = CurrentUser::from(&user);

    // Operators hold a shift while logged in
    let shift = if user.role == Role::Operator {
        let mut shift_repo = Shifts::new(&mut conn);
        Some(ShiftResponse::from(
            shift_repo.open(user.id, &current_user.park_zone).await?,
        ))
    } else {
        None
    };

    let token = session::create_session_token(&current_user, &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    Ok(LoginResponse {
        auth_response: AuthResponse {
            user: UserResponse::from(user),
            shift,
            message: "Login successful".to_string(),
        },
        cookie,
    })
}

/// Logout.
///
/// For operators this settles the open shift: all of the operator's
/// confirmed-but-unreconciled sessions are summed, marked settled, and the
/// total plus logout time is written onto the shift, all in one
/// transaction. With nothing to settle the shift row is left untouched and
/// the condition is reported in the response.
#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logout successful", body = LogoutBody),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn logout(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<LogoutResponse, Error> {
    let (shift, message) = if current_user.role == Role::Operator {
        match close_shift(&state, &current_user).await {
            Ok(shift) => (Some(shift), "Logout successful".to_string()),
            Err(Error::NothingToSettle) => (None, "Logout successful; nothing to settle".to_string()),
            Err(e) => return Err(e),
        }
    } else {
        (None, "Logout successful".to_string())
    };

    // Reset this zone's live counter and tell listeners
    state.occupancy.reset(&current_user.park_zone);
    state.notifier.publish(ParkEvent::OccupancyReset {
        park_zone: current_user.park_zone.clone(),
    });

    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0",
        state.config.auth.cookie_name
    );

    Ok(LogoutResponse {
        body: LogoutBody {
            shift,
            message,
        },
        cookie,
    })
}

/// Settle an operator's open shift in one transaction.
async fn close_shift(state: &AppState, current_user: &CurrentUser) -> Result<ShiftResponse, Error> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let mut session_repo = Sessions::new(&mut tx);
    let sessions = session_repo.lock_unsettled_by_cashier(current_user.id).await?;

    let total = settlement_total(sessions.iter().map(|s| &s.fee))
        .ok_or(Error::NothingToSettle)?;

    session_repo.mark_settled(current_user.id).await?;

    let mut shift_repo = Shifts::new(&mut tx);
    let shift = shift_repo
        .lock_open_for_operator(current_user.id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "open shift".to_string(),
            id: current_user.id.to_string(),
        })?;
    let shift = shift_repo.close(shift.id, total, Utc::now()).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    tracing::info!(
        shift_id = shift.id,
        sessions = sessions.len(),
        %total,
        "shift settled"
    );

    Ok(ShiftResponse::from(shift))
}

/// Get the current authenticated user
#[utoipa::path(
    get,
    path = "/authentication/me",
    tag = "authentication",
    responses(
        (status = 200, description = "Current user", body = CurrentUser),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn me(current_user: CurrentUser) -> Json<CurrentUser> {
    Json(current_user)
}

/// Helper to create a session cookie
fn create_session_cookie(token: &str, config: &crate::config::Config) -> String {
    let max_age = config.auth.jwt_expiry.as_secs();
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        config.auth.cookie_name, token, max_age
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::models::sessions::{REASON_AWAITING_PAYMENT, REASON_ENTRY, REASON_PAID},
        config::Config,
        db::models::sessions::{
            SessionCreateDBRequest, SessionExitDBRequest, SessionSettleDBRequest,
        },
        test_utils::{create_test_state, create_test_user},
        types::UserId,
    };
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    #[test]
    fn test_session_cookie_format() {
        let config = Config {
            secret_key: Some("k".into()),
            ..Default::default()
        };
        let cookie = create_session_cookie("tok123", &config);

        assert!(cookie.starts_with("parkd_session=tok123;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=43200"));
    }

    /// A session entered, exited and confirmed by the given cashier.
    async fn settled_session(pool: &PgPool, plate: &str, fee: Decimal, cashier_id: UserId) {
        let mut conn = pool.acquire().await.unwrap();
        let mut sessions = Sessions::new(&mut conn);

        let session = sessions
            .create_entry(&SessionCreateDBRequest {
                plate: plate.to_string(),
                park_zone: "P4".to_string(),
                image_ref: "testPhoto.png".to_string(),
                reason: REASON_ENTRY.to_string(),
            })
            .await
            .unwrap();
        let session = sessions
            .apply_exit(
                session.id,
                session.version,
                &SessionExitDBRequest {
                    exited_at: Utc::now(),
                    duration_minutes: 30,
                    fee,
                    reason: REASON_AWAITING_PAYMENT.to_string(),
                    camera_channel: "P4-2".to_string(),
                    camera_token: None,
                },
            )
            .await
            .unwrap();
        sessions
            .apply_settlement(
                session.id,
                session.version,
                &SessionSettleDBRequest {
                    reason: REASON_PAID.to_string(),
                    fee,
                    cashier_id,
                },
            )
            .await
            .unwrap();
    }

    #[sqlx::test]
    async fn test_close_shift_settles_sessions_and_stamps_logout(pool: PgPool) {
        let state = create_test_state(pool.clone());
        let operator = create_test_user(&pool, Role::Operator, "P4").await;
        let current_user = CurrentUser::from(&operator);

        {
            let mut conn = pool.acquire().await.unwrap();
            Shifts::new(&mut conn).open(operator.id, "P4").await.unwrap();
        }
        settled_session(&pool, "AA1111AA", Decimal::TWO, operator.id).await;
        settled_session(&pool, "BB2222BB", Decimal::from(3), operator.id).await;

        let shift = close_shift(&state, &current_user).await.unwrap();
        assert!(shift.logout_at.is_some());
        assert_eq!(shift.collected, Decimal::from(5));

        // Both sessions rolled into the settlement
        let mut conn = pool.acquire().await.unwrap();
        let remaining = Sessions::new(&mut conn)
            .lock_unsettled_by_cashier(operator.id)
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[sqlx::test]
    async fn test_close_shift_with_nothing_to_settle_leaves_shift_open(pool: PgPool) {
        let state = create_test_state(pool.clone());
        let operator = create_test_user(&pool, Role::Operator, "P4").await;

        {
            let mut conn = pool.acquire().await.unwrap();
            Shifts::new(&mut conn).open(operator.id, "P4").await.unwrap();
        }

        let err = close_shift(&state, &CurrentUser::from(&operator))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NothingToSettle));

        let mut conn = pool.acquire().await.unwrap();
        let open = Shifts::new(&mut conn)
            .lock_open_for_operator(operator.id)
            .await
            .unwrap();
        assert!(open.is_some());
    }
}
