//! Authentication
//!
//! - `jwt`: Session token creation and validation
//! - `password`: Argon2id hashing and verification
//! - `middleware`: Cookie extraction and the per-request auth context

pub mod jwt;
pub mod middleware;
pub mod password;
