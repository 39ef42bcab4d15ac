//! OpenAPI documentation for the management API at `/api/v1/*`.
//!
//! The generated document is served at `/api-docs/openapi.json`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;

/// Session-cookie security scheme.
struct CookieSecurityAddon;

impl Modify for CookieSecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "CookieAuth".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "parkd_session",
                    "JWT session cookie set by `POST /authentication/login`.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/api/v1", description = "Management API server")
    ),
    modifiers(&CookieSecurityAddon),
    paths(
        // Authentication and shifts
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::me,
        // Gate camera events
        api::handlers::camera_events::vehicle_entry,
        api::handlers::camera_events::vehicle_exit,
        // Sessions
        api::handlers::sessions::list_sessions,
        api::handlers::sessions::get_session,
        api::handlers::sessions::settle_session,
        // Shifts
        api::handlers::shifts::list_shifts,
        // Users
        api::handlers::users::create_user,
        api::handlers::users::list_users,
        api::handlers::users::get_user,
        api::handlers::users::update_user,
        api::handlers::users::delete_user,
        // Tariffs
        api::handlers::tariffs::create_tariff,
        api::handlers::tariffs::list_tariffs,
        api::handlers::tariffs::get_tariff,
        api::handlers::tariffs::update_tariff,
        api::handlers::tariffs::delete_tariff,
        // Cameras
        api::handlers::cameras::create_camera,
        api::handlers::cameras::list_cameras,
        api::handlers::cameras::update_camera,
        api::handlers::cameras::delete_camera,
        // Occupancy
        api::handlers::occupancy::get_occupancy,
        api::handlers::occupancy::update_occupancy,
        // Health
        api::handlers::probes::healthz,
    ),
    components(
        schemas(
            api::models::auth::LoginRequest,
            api::models::auth::AuthResponse,
            api::models::auth::LogoutBody,
            api::models::cameras::CameraDirection,
            api::models::cameras::CameraCreate,
            api::models::cameras::CameraUpdate,
            api::models::cameras::CameraResponse,
            api::models::occupancy::OccupancyUpdate,
            api::models::occupancy::OccupancyResponse,
            api::models::sessions::SessionStatus,
            api::models::sessions::CameraEvent,
            api::models::sessions::SessionResponse,
            api::models::sessions::EntryResponse,
            api::models::sessions::ExitResponse,
            api::models::sessions::SettlementRequest,
            api::models::shifts::ShiftResponse,
            api::models::tariffs::TariffCreate,
            api::models::tariffs::TariffResponse,
            api::models::tariffs::TariffListResponse,
            api::models::users::Role,
            api::models::users::CurrentUser,
            api::models::users::UserCreate,
            api::models::users::UserUpdate,
            api::models::users::UserResponse,
            api::handlers::probes::HealthResponse,
        )
    ),
    tags(
        (name = "authentication", description = "Registration, login and logout. Operator logout settles the shift."),
        (name = "camera", description = "Entry and exit events pushed by the gate cameras."),
        (name = "sessions", description = "Vehicle session queries and cashier settlement."),
        (name = "shifts", description = "Operator shift reporting (accountant only)."),
        (name = "users", description = "Staff account administration (admin only)."),
        (name = "tariffs", description = "VIP tariff administration (accountant only)."),
        (name = "cameras", description = "Gate camera registry administration (admin only)."),
        (name = "occupancy", description = "Live per-zone occupancy counters."),
        (name = "health", description = "Service health probes."),
    ),
    info(
        title = "parkd API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Parking-lot management backend: vehicle lifecycle tracking, \
fee settlement and operator shift reconciliation.

## Authentication

Most endpoints require the `parkd_session` cookie issued by
`POST /authentication/login`. Camera event endpoints authenticate with the
camera's registered channel instead.",
    ),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        assert!(json.contains("/sessions/{plate}/settlement"));
        assert!(json.contains("CookieAuth"));
    }
}
