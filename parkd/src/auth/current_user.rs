use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};

/// Extract a user from the JWT session cookie if present and valid.
/// Returns:
/// - None: no session cookie present
/// - Some(Ok(user)): valid JWT found and verified
/// - Some(Err(error)): cookie header present but unreadable
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                match session::verify_session_token(value, config) {
                    Ok(user) => return Some(Ok(user)),
                    // Expired or stale tokens are expected; keep scanning
                    Err(_) => continue,
                }
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_jwt_session_auth(parts, &state.config) {
            Some(Ok(user)) => {
                trace!("Found JWT session authenticated user: {}", user.id);
                Ok(user)
            }
            Some(Err(e)) => {
                trace!("JWT session authentication failed: {:?}", e);
                Err(Error::Unauthenticated { message: None })
            }
            None => {
                trace!("No authentication credentials found in request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::config::Config;
    use uuid::Uuid;

    fn test_config() -> Config {
        Config {
            secret_key: Some("test-secret".to_string()),
            ..Default::default()
        }
    }

    fn parts_with_cookie(cookie: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(axum::http::header::COOKIE, cookie)
            .body(())
            .unwrap();
        request.into_parts().0
    }

    #[test]
    fn test_valid_session_cookie() {
        let config = test_config();
        let user = CurrentUser {
            id: Uuid::new_v4(),
            username: "gate1".into(),
            role: Role::Operator,
            park_zone: "P4".into(),
        };
        let token = session::create_session_token(&user, &config).unwrap();
        let parts = parts_with_cookie(&format!("{}={token}", config.auth.cookie_name));

        let result = try_jwt_session_auth(&parts, &config);
        assert_eq!(result.unwrap().unwrap(), user);
    }

    #[test]
    fn test_missing_cookie_is_none() {
        let config = test_config();
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .body(())
            .unwrap();
        let parts = request.into_parts().0;

        assert!(try_jwt_session_auth(&parts, &config).is_none());
    }

    #[test]
    fn test_garbage_token_is_skipped() {
        let config = test_config();
        let parts = parts_with_cookie(&format!("{}=not-a-jwt", config.auth.cookie_name));

        assert!(try_jwt_session_auth(&parts, &config).is_none());
    }

    #[test]
    fn test_unrelated_cookies_ignored() {
        let config = test_config();
        let parts = parts_with_cookie("theme=dark; lang=en");

        assert!(try_jwt_session_auth(&parts, &config).is_none());
    }
}
