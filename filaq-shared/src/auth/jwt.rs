//! Session tokens
//!
//! A session is one HS256 JWT carried in the `auth-token` cookie. There is
//! a single token kind with a 7-day lifetime matching the cookie's max-age;
//! the claims bind the session to both the user and their company, so staff
//! handlers scope tenant queries straight off the token without a lookup.
//!
//! The signing secret comes from `JWT_SECRET` and must be at least 32
//! bytes; config loading enforces that at startup.
//!
//! # Example
//!
//! ```
//! use filaq_shared::auth::jwt::{sign, verify, Claims};
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secret = "test-secret-key-at-least-32-bytes-long";
//! let token = sign(&Claims::new(Uuid::new_v4(), Uuid::new_v4()), secret)?;
//! let claims = verify(&token, secret)?;
//! assert_eq!(claims.iss, "filaq");
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped on and required of every token
const ISSUER: &str = "filaq";

/// Session lifetime; must stay in step with the auth cookie's max-age
pub const SESSION_LIFETIME_DAYS: i64 = 7;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Token was valid once but its lifetime is over
    #[error("session token has expired")]
    Expired,

    /// Token failed signing or any other validation check
    #[error("session token rejected: {0}")]
    Rejected(String),
}

/// Claims carried by a session token
///
/// `sub` is the user, `company_id` the tenant; the rest are the standard
/// time/issuer claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Company ID (tenant claim)
    pub company_id: Uuid,

    /// Issuer, always "filaq"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for a fresh 7-day session
    pub fn new(user_id: Uuid, company_id: Uuid) -> Self {
        Self::expiring_in(user_id, company_id, Duration::days(SESSION_LIFETIME_DAYS))
    }

    /// Claims with an arbitrary lifetime; tests use negative durations to
    /// produce already-expired tokens
    pub fn expiring_in(user_id: Uuid, company_id: Uuid, lifetime: Duration) -> Self {
        let issued = Utc::now().timestamp();

        Self {
            sub: user_id,
            company_id,
            iss: ISSUER.to_string(),
            iat: issued,
            nbf: issued,
            exp: issued + lifetime.num_seconds(),
        }
    }

    /// Whether the expiration timestamp has passed
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a session token
///
/// # Errors
///
/// Returns [`JwtError::Rejected`] if encoding fails
pub fn sign(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::Rejected(e.to_string()))
}

/// Verifies a session token and returns its claims
///
/// Checks the signature, the expiration and not-before timestamps, and the
/// issuer.
///
/// # Errors
///
/// Returns [`JwtError::Expired`] past the token's lifetime and
/// [`JwtError::Rejected`] for every other problem
pub fn verify(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_nbf = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Rejected(e.to_string()),
    })
}
