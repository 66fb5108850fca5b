//! Error handling for the API server
//!
//! Provides a unified error type that maps to HTTP responses. All handlers
//! return `Result<T, ApiError>`, which converts to a JSON error body with
//! the right status code.
//!
//! Status mapping follows the dashboard/kiosk pages' contract: uniqueness
//! conflicts (duplicate prefix, duplicate email) and illegal status
//! transitions are 400s the pages show inline, not 409s.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use filaq_shared::auth::jwt::JwtError;
use filaq_shared::auth::middleware::AuthError;
use filaq_shared::auth::password::PasswordError;
use filaq_shared::sequence::SequenceError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400) - illegal operation for the current state
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404) - also covers resources outside the caller's tenant
    NotFound(String),

    /// Uniqueness conflict (400) - duplicate prefix, duplicate email
    Conflict(String),

    /// Unprocessable entity (422) - request validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g. "not_found", "conflict")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log the details, never expose them to clients.
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already registered".to_string());
                    }
                    if constraint.contains("prefix") {
                        return ApiError::Conflict(
                            "A queue with this prefix already exists".to_string(),
                        );
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert sequence engine errors to API errors
impl From<SequenceError> for ApiError {
    fn from(err: SequenceError) -> Self {
        match err {
            SequenceError::QueueNotFound => ApiError::NotFound("Queue not found".to_string()),
            SequenceError::TicketNotFound => ApiError::NotFound("Ticket not found".to_string()),
            SequenceError::NoWaitingTicket => {
                ApiError::BadRequest("No ticket is waiting".to_string())
            }
            SequenceError::InvalidState { .. } => {
                ApiError::BadRequest("Ticket is not being served".to_string())
            }
            SequenceError::Database(e) => {
                // Includes unretried write conflicts; surfaces as a 500.
                ApiError::InternalError(format!("Database error: {}", e))
            }
        }
    }
}

/// Convert auth layer errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCookie => {
                ApiError::Unauthorized("Missing session cookie".to_string())
            }
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Session expired".to_string()),
            other => ApiError::Unauthorized(format!("Invalid token: {}", other)),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert validator errors to the 422 validation payload
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filaq_shared::models::ticket::TicketStatus;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Queue not found".to_string());
        assert_eq!(err.to_string(), "Not found: Queue not found");
    }

    #[test]
    fn test_sequence_error_mapping() {
        assert!(matches!(
            ApiError::from(SequenceError::QueueNotFound),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(SequenceError::NoWaitingTicket),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(SequenceError::InvalidState {
                current: TicketStatus::Done,
                expected: TicketStatus::InProgress,
            }),
            ApiError::BadRequest(_)
        ));
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        assert!(matches!(
            ApiError::from(sqlx::Error::RowNotFound),
            ApiError::NotFound(_)
        ));
    }
}
