//! API types for authentication.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::models::shifts::ShiftResponse;
use crate::api::models::users::UserResponse;

use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

/// Login credentials
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response after a successful login.
///
/// `shift` is present for operators, whose login opens a shift.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift: Option<ShiftResponse>,
    pub message: String,
}

/// Response after a successful logout.
///
/// `shift` carries the settled shift for operators.
#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift: Option<ShiftResponse>,
    pub message: String,
}

/// Structured response for successful login, carrying the session cookie
pub struct LoginResponse {
    pub auth_response: AuthResponse,
    pub cookie: String,
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(header::SET_COOKIE, self.cookie.parse().unwrap());
        (StatusCode::OK, headers, Json(self.auth_response)).into_response()
    }
}

/// Structured response for successful logout, clearing the session cookie
pub struct LogoutResponse {
    pub body: LogoutBody,
    pub cookie: String,
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(header::SET_COOKIE, self.cookie.parse().unwrap());
        (StatusCode::OK, headers, Json(self.body)).into_response()
    }
}
