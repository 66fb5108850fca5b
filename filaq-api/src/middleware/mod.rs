//! HTTP middleware
//!
//! - `security`: Security headers on every response

pub mod security;
