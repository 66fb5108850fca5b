//! Cookie authentication for Axum
//!
//! Staff sessions ride in an HTTP-only cookie holding a signed JWT. The
//! router installs a layer (see the API crate's `app` module) that runs
//! [`authenticate`] on each request and injects the resulting
//! [`AuthContext`] into request extensions; handlers extract it with Axum's
//! `Extension` extractor.
//!
//! The kiosk and display endpoints are deliberately unauthenticated and
//! never pass through this code.
//!
//! # Example
//!
//! ```
//! use axum::Extension;
//! use filaq_shared::auth::middleware::AuthContext;
//!
//! async fn handler(Extension(auth): Extension<AuthContext>) -> String {
//!     format!("User: {}, Company: {}", auth.user_id, auth.company_id)
//! }
//! ```

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{verify, JwtError};

/// Name of the session cookie
pub const AUTH_COOKIE: &str = "auth-token";

/// Authentication context added to request extensions
///
/// Both IDs come from the validated token's claims; every staff handler
/// scopes its queries by `company_id`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// The user's company (tenant) ID
    pub company_id: Uuid,
}

/// Error type for the authentication layer
#[derive(Debug)]
pub enum AuthError {
    /// No session cookie on the request
    MissingCookie,

    /// Cookie present but the token failed validation
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCookie => {
                (StatusCode::UNAUTHORIZED, "Missing session cookie").into_response()
            }
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Session expired".to_string()),
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

/// Pulls the session token out of the request's Cookie header, if any
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    jar.get(AUTH_COOKIE).map(|c| c.value().to_string())
}

/// Authenticates a request from its headers
///
/// Extracts the session cookie, validates the token, and returns the
/// [`AuthContext`] carried in its claims.
///
/// # Errors
///
/// - [`AuthError::MissingCookie`] if no session cookie is present
/// - [`AuthError::InvalidToken`] if the token is expired or otherwise invalid
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = session_token(headers).ok_or(AuthError::MissingCookie)?;
    let claims = verify(&token, secret)?;

    Ok(AuthContext {
        user_id: claims.sub,
        company_id: claims.company_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{sign, Claims};
    use axum::http::header::COOKIE;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_session_token_extraction() {
        let headers = headers_with_cookie("auth-token=abc123; theme=dark");
        assert_eq!(session_token(&headers), Some("abc123".to_string()));

        let headers = headers_with_cookie("theme=dark");
        assert_eq!(session_token(&headers), None);

        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_authenticate_valid_cookie() {
        let user_id = Uuid::new_v4();
        let company_id = Uuid::new_v4();
        let token = sign(&Claims::new(user_id, company_id), SECRET).unwrap();

        let headers = headers_with_cookie(&format!("auth-token={}", token));
        let auth = authenticate(&headers, SECRET).expect("Should authenticate");

        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.company_id, company_id);
    }

    #[test]
    fn test_authenticate_missing_cookie() {
        let result = authenticate(&HeaderMap::new(), SECRET);
        assert!(matches!(result, Err(AuthError::MissingCookie)));
    }

    #[test]
    fn test_authenticate_garbage_token() {
        let headers = headers_with_cookie("auth-token=garbage");
        let result = authenticate(&headers, SECRET);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }
}
