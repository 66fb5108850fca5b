//! Password hashing using Argon2id
//!
//! Staff passwords are stored as PHC strings produced by Argon2id with the
//! parameters below. The parameters travel inside the hash, so they can be
//! raised later without invalidating existing accounts; verification always
//! honors whatever the stored hash declares.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};

/// Memory cost in KiB (64 MB)
const M_COST: u32 = 65536;

/// Iteration count
const T_COST: u32 = 3;

/// Parallelism lanes
const P_COST: u32 = 4;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Hashing failed
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Stored hash is not a parseable PHC string
    #[error("stored password hash is malformed: {0}")]
    Malformed(String),

    /// Verification failed for a reason other than a wrong password
    #[error("password verification failed: {0}")]
    Verify(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(M_COST, T_COST, P_COST, Some(32))
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password, salting it with 16 random bytes from the OS RNG
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if hashing fails
///
/// # Example
///
/// ```
/// use filaq_shared::auth::password::hash_password;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("correct horse battery staple")?;
/// assert!(hash.starts_with("$argon2id$"));
/// # Ok(())
/// # }
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored hash in constant time
///
/// A wrong password is `Ok(false)`, not an error; errors mean the stored
/// hash itself is unusable.
///
/// # Errors
///
/// Returns [`PasswordError::Malformed`] if the stored hash cannot be
/// parsed, [`PasswordError::Verify`] on any other failure
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::Malformed(e.to_string()))?;

    // Parameters come from the parsed hash, not from our current defaults.
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e.to_string())),
    }
}
