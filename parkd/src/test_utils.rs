//! Shared helpers for database-backed tests.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    AppState,
    api::models::users::Role,
    config::Config,
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
    notifications::ParkNotifier,
    occupancy::OccupancyBoard,
    vip::VipFilter,
};

pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    }
}

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState {
        db: pool,
        config: create_test_config(),
        vip: Arc::new(VipFilter::new()),
        occupancy: Arc::new(OccupancyBoard::new()),
        notifier: ParkNotifier::new(),
    }
}

/// Insert an active user with a unique username.
pub async fn create_test_user(pool: &PgPool, role: Role, park_zone: &str) -> UserDBResponse {
    let mut conn = pool.acquire().await.unwrap();
    let mut repo = Users::new(&mut conn);
    repo.create(&UserCreateDBRequest {
        username: format!("user-{}", uuid::Uuid::new_v4()),
        first_name: Some("Test".to_string()),
        last_name: Some("User".to_string()),
        password_hash: "not-a-real-hash".to_string(),
        role,
        park_zone: Some(park_zone.to_string()),
        is_active: true,
    })
    .await
    .unwrap()
}
