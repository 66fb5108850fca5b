//! Authentication endpoints
//!
//! Signup creates a company and its first staff user in one transaction;
//! login verifies credentials and sets the session cookie; logout clears
//! it. The session rides in an HTTP-only `auth-token` cookie holding a
//! 7-day JWT — see `filaq_shared::auth`.
//!
//! # Endpoints
//!
//! - `POST /auth/signup` - Register a company and its first user
//! - `POST /auth/login` - Verify credentials, set session cookie
//! - `POST /auth/logout` - Clear session cookie
//! - `GET  /auth/me` - Current user and company (requires cookie)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use filaq_shared::{
    auth::{
        jwt::{sign, Claims, SESSION_LIFETIME_DAYS},
        middleware::{AuthContext, AUTH_COOKIE},
        password,
    },
    models::{
        company::{Company, CreateCompany},
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Business name
    #[validate(length(min = 1, max = 255, message = "Company name is required"))]
    pub company_name: String,

    /// Email address for the first staff account
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Signup response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    /// Created user ID
    pub user_id: Uuid,

    /// Created company ID
    pub company_id: Uuid,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response (the session itself travels in the Set-Cookie header)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// The user's company ID
    pub company_id: Uuid,
}

/// Logout / message-only response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}

/// Current-user response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Company ID
    pub company_id: Uuid,

    /// The user's company
    pub company: CompanySummary,
}

/// Company id + name pair embedded in responses
#[derive(Debug, Serialize)]
pub struct CompanySummary {
    /// Company ID
    pub id: Uuid,

    /// Company name
    pub name: String,
}

/// Builds the session cookie around a signed token
fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_secure(secure);
    cookie.set_max_age(time::Duration::days(SESSION_LIFETIME_DAYS));
    cookie
}

/// Signup endpoint
///
/// Creates the company and its first user atomically: a failed user insert
/// (say, a duplicate email) must not leave an orphaned company behind.
///
/// # Errors
///
/// - `400 Bad Request`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Server error
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let mut tx = state.db.begin().await?;

    let company = Company::create(
        &mut *tx,
        CreateCompany {
            name: req.company_name.clone(),
        },
    )
    .await?;

    let user = User::create(
        &mut *tx,
        CreateUser {
            email: req.email.clone(),
            password_hash,
            company_id: company.id,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        user_id = %user.id,
        company_id = %company.id,
        "Company registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user_id: user.id,
            company_id: company.id,
        }),
    ))
}

/// Login endpoint
///
/// Verifies credentials and sets the session cookie. A missing user and a
/// wrong password produce the same message; no account probing.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let claims = Claims::new(user.id, user.company_id);
    let token = sign(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User logged in");

    let jar = jar.add(session_cookie(token, state.config.api.production));

    Ok((
        jar,
        Json(LoginResponse {
            user_id: user.id,
            company_id: user.company_id,
        }),
    ))
}

/// Logout endpoint
///
/// Clears the session cookie. Idempotent; succeeds with or without an
/// existing session.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));

    (
        jar,
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}

/// Current-user endpoint
///
/// Resolves the session's user and company. A 404 here means the account
/// was deleted after the token was issued.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid session cookie
/// - `404 Not Found`: User or company no longer exists
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let company = Company::find_by_id(&state.db, user.company_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    Ok(Json(MeResponse {
        id: user.id,
        email: user.email,
        company_id: user.company_id,
        company: CompanySummary {
            id: company.id,
            name: company.name,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_validation() {
        let valid = SignupRequest {
            company_name: "Acme Barbershop".to_string(),
            email: "owner@acme.example".to_string(),
            password: "long-enough-password".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = SignupRequest {
            company_name: "Acme Barbershop".to_string(),
            email: "not-an-email".to_string(),
            password: "long-enough-password".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let short_password = SignupRequest {
            company_name: "Acme Barbershop".to_string(),
            email: "owner@acme.example".to_string(),
            password: "short".to_string(),
        };
        assert!(short_password.validate().is_err());

        let empty_company = SignupRequest {
            company_name: "".to_string(),
            email: "owner@acme.example".to_string(),
            password: "long-enough-password".to_string(),
        };
        assert!(empty_company.validate().is_err());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("token-value".to_string(), true);

        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.value(), "token-value");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
    }

    #[test]
    fn test_session_cookie_not_secure_in_development() {
        let cookie = session_cookie("token-value".to_string(), false);
        assert_eq!(cookie.secure(), Some(false));
    }
}
