//! API types for staff users.

use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Staff role, controls which endpoints a user may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including user and camera management
    Admin,
    /// Gate operator; holds shifts and settles sessions
    Operator,
    /// Read access to reports and settlements
    Accountant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
            Role::Accountant => "accountant",
        };
        write!(f, "{s}")
    }
}

/// The authenticated principal, reconstructed from the session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = Uuid)]
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub park_zone: String,
}

impl CurrentUser {
    /// Require the given role, or admin.
    pub fn require_role(&self, role: Role, action: &str, resource: &str) -> crate::errors::Result<()> {
        if self.role == role || self.role == Role::Admin {
            Ok(())
        } else {
            Err(crate::errors::Error::Forbidden {
                action: action.to_string(),
                resource: resource.to_string(),
            })
        }
    }

    /// Require the admin role.
    pub fn require_admin(&self, action: &str, resource: &str) -> crate::errors::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(crate::errors::Error::Forbidden {
                action: action.to_string(),
                resource: resource.to_string(),
            })
        }
    }
}

impl From<&UserDBResponse> for CurrentUser {
    fn from(db: &UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username.clone(),
            role: db.role,
            park_zone: db.park_zone.clone().unwrap_or_default(),
        }
    }
}

/// Request to create a user
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserCreate {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Plaintext password, hashed before storage
    pub password: String,
    pub role: Role,
    /// Park zone the user is assigned to, e.g. "P4"
    pub park_zone: Option<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

/// Request to update a user; all fields optional
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub park_zone: Option<String>,
    pub is_active: Option<bool>,
}

/// A user as returned by the API. Never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = Uuid)]
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub park_zone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        // Nullable columns come back as empty strings so clients never
        // see a null name or zone
        Self {
            id: db.id,
            username: db.username,
            first_name: db.first_name.unwrap_or_default(),
            last_name: db.last_name.unwrap_or_default(),
            role: db.role,
            park_zone: db.park_zone.unwrap_or_default(),
            is_active: db.is_active,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let r: Role = serde_json::from_str("\"accountant\"").unwrap();
        assert_eq!(r, Role::Accountant);
    }

    #[test]
    fn test_user_create_defaults_active() {
        let raw = r#"{
            "username": "gate1",
            "first_name": "Gate",
            "last_name": "Operator",
            "password": "secret",
            "role": "operator",
            "park_zone": "P4"
        }"#;
        let req: UserCreate = serde_json::from_str(raw).unwrap();
        assert!(req.is_active);
        assert_eq!(req.role, Role::Operator);
        assert_eq!(req.first_name.as_deref(), Some("Gate"));
        assert_eq!(req.park_zone.as_deref(), Some("P4"));
    }

    #[test]
    fn test_user_create_names_and_zone_are_optional() {
        let raw = r#"{
            "username": "books",
            "password": "secret",
            "role": "accountant"
        }"#;
        let req: UserCreate = serde_json::from_str(raw).unwrap();
        assert_eq!(req.first_name, None);
        assert_eq!(req.last_name, None);
        assert_eq!(req.park_zone, None);
    }

    #[test]
    fn test_user_response_fills_missing_fields() {
        let db = UserDBResponse {
            id: uuid::Uuid::new_v4(),
            username: "admin".into(),
            first_name: None,
            last_name: None,
            password_hash: "hash".into(),
            role: Role::Admin,
            park_zone: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let response = UserResponse::from(db);
        assert_eq!(response.first_name, "");
        assert_eq!(response.last_name, "");
        assert_eq!(response.park_zone, "");
    }

    fn current(role: Role) -> CurrentUser {
        CurrentUser {
            id: uuid::Uuid::new_v4(),
            username: "someone".into(),
            role,
            park_zone: "P4".into(),
        }
    }

    #[test]
    fn test_require_admin() {
        assert!(current(Role::Admin).require_admin("manage", "users").is_ok());
        let err = current(Role::Operator)
            .require_admin("manage", "users")
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_require_role_admin_always_passes() {
        assert!(
            current(Role::Admin)
                .require_role(Role::Operator, "settle", "sessions")
                .is_ok()
        );
        assert!(
            current(Role::Operator)
                .require_role(Role::Operator, "settle", "sessions")
                .is_ok()
        );
        assert!(
            current(Role::Accountant)
                .require_role(Role::Operator, "settle", "sessions")
                .is_err()
        );
    }
}
