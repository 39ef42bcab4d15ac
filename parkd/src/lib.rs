//! Parking-lot management backend.
//!
//! parkd tracks vehicle sessions from the moment a gate camera reports an
//! entry until the fee is settled and the operator's shift is reconciled.
//! It exposes a cookie-authenticated management API for staff and a
//! camera-facing event API for the gate hardware.
//!
//! # Architecture
//!
//! - [`api`]: axum handlers and request/response models
//! - [`auth`]: password hashing and JWT session cookies
//! - [`db`]: sqlx repositories and row models
//! - [`fees`]: duration-based fee schedule
//! - [`vip`]: bloom-filter membership test for VIP plates
//! - [`occupancy`]: in-memory per-zone occupancy counters
//! - [`notifications`]: broadcast channel for operator screen refreshes

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use sqlx::PgPool;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument, warn};
use utoipa::OpenApi;

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod fees;
pub mod notifications;
pub mod occupancy;
pub mod openapi;
pub mod telemetry;
#[cfg(test)]
pub mod test_utils;
pub mod types;
pub mod vip;

use crate::{
    api::models::users::Role,
    db::{
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    notifications::ParkNotifier,
    occupancy::OccupancyBoard,
    vip::VipFilter,
};

pub use config::Config;
pub use errors::Error;
pub use types::{CameraId, SessionId, ShiftId, TariffId, UserId};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `db`: PostgreSQL connection pool
/// - `config`: application configuration
/// - `vip`: bloom filter over the registered VIP plates
/// - `occupancy`: live per-zone occupancy counters
/// - `notifier`: broadcast channel for operator screen events
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub vip: Arc<VipFilter>,
    pub occupancy: Arc<OccupancyBoard>,
    pub notifier: ParkNotifier,
}

/// Get the parkd database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: creates the admin on first startup, updates the password on
/// subsequent startups when one is configured. When no admin password is
/// configured and the user does not exist yet, nothing is created and a
/// warning is logged.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(
    username: &str,
    password: Option<&str>,
    db: &PgPool,
) -> anyhow::Result<Option<UserId>> {
    let password_hash = match password {
        Some(pwd) => Some(auth::password::hash_password(pwd)?),
        None => None,
    };

    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    if let Some(existing_user) = user_repo.get_by_username(username).await? {
        if let Some(password_hash) = password_hash {
            sqlx::query("UPDATE users SET password_hash = $1 WHERE username = $2")
                .bind(password_hash)
                .bind(username)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        return Ok(Some(existing_user.id));
    }

    let Some(password_hash) = password_hash else {
        warn!("No admin password configured and no admin user exists; skipping admin creation");
        return Ok(None);
    };

    let created = user_repo
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            first_name: None,
            last_name: None,
            password_hash,
            role: Role::Admin,
            park_zone: None,
            is_active: true,
        })
        .await?;

    tx.commit().await?;
    info!(username, "Created initial admin user");
    Ok(Some(created.id))
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    // Credentialed requests: the session cookie must survive CORS
    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(tower_http::cors::AllowMethods::mirror_request())
        .allow_headers(tower_http::cors::AllowHeaders::mirror_request()))
}

/// Build the application router with all endpoints and middleware.
///
/// Everything lives under `/api/v1`; the OpenAPI document is served at
/// `/api-docs/openapi.json`.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    // Authentication routes, including operator shift open/close
    let auth_routes = Router::new()
        .route("/authentication/register", post(api::handlers::auth::register))
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .route("/authentication/me", get(api::handlers::auth::me));

    // Gate camera event routes
    let camera_routes = Router::new()
        .route("/camera/events/entry", post(api::handlers::camera_events::vehicle_entry))
        .route("/camera/events/exit", put(api::handlers::camera_events::vehicle_exit));

    let api_routes = Router::new()
        // Session queries and cashier settlement
        .route("/sessions", get(api::handlers::sessions::list_sessions))
        .route("/sessions/search", get(api::handlers::sessions::list_sessions))
        .route("/sessions/{id}", get(api::handlers::sessions::get_session))
        .route("/sessions/{plate}/settlement", put(api::handlers::sessions::settle_session))
        // Shift reporting (accountant only)
        .route("/shifts", get(api::handlers::shifts::list_shifts))
        // Staff management (admin only)
        .route("/users", get(api::handlers::users::list_users))
        .route("/users", post(api::handlers::users::create_user))
        .route("/users/{id}", get(api::handlers::users::get_user))
        .route("/users/{id}", put(api::handlers::users::update_user))
        .route("/users/{id}", delete(api::handlers::users::delete_user))
        // VIP tariffs (admin only)
        .route("/tariffs", get(api::handlers::tariffs::list_tariffs))
        .route("/tariffs/search", get(api::handlers::tariffs::list_tariffs))
        .route("/tariffs", post(api::handlers::tariffs::create_tariff))
        .route("/tariffs/{id}", get(api::handlers::tariffs::get_tariff))
        .route("/tariffs/{id}", put(api::handlers::tariffs::update_tariff))
        .route("/tariffs/{id}", delete(api::handlers::tariffs::delete_tariff))
        // Camera registry (admin only)
        .route("/cameras", get(api::handlers::cameras::list_cameras))
        .route("/cameras", post(api::handlers::cameras::create_camera))
        .route("/cameras/{id}", put(api::handlers::cameras::update_camera))
        .route("/cameras/{id}", delete(api::handlers::cameras::delete_camera))
        // Occupancy counters
        .route("/occupancy", get(api::handlers::occupancy::get_occupancy))
        .route("/occupancy", put(api::handlers::occupancy::update_occupancy))
        // Health
        .route("/healthz", get(api::handlers::probes::healthz));

    let v1 = auth_routes.merge(camera_routes).merge(api_routes);

    let router = Router::new()
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(openapi::ApiDoc::openapi()) }),
        )
        .nest("/api/v1", v1)
        .with_state(state.clone());

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, seeds the admin user and warms the VIP filter
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let Some(database_url) = config.database_url.clone() else {
            anyhow::bail!("database_url is not configured; set DATABASE_URL or add it to the config file");
        };

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&database_url)
            .await?;
        migrator().run(&pool).await?;

        create_initial_admin_user(&config.admin_username, config.admin_password.as_deref(), &pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {e}"))?;

        let state = AppState {
            db: pool.clone(),
            config: config.clone(),
            vip: Arc::new(VipFilter::new()),
            occupancy: Arc::new(OccupancyBoard::new()),
            notifier: ParkNotifier::new(),
        };

        // Warm the VIP filter so the first exit event sees current tariffs
        state.vip.reload_from_db(&pool).await?;

        let router = build_router(&state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        info!("parkd listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
