//! # Filaq Shared Library
//!
//! Core functionality shared by the filaq binaries.
//!
//! ## Modules
//!
//! - `auth`: JWT tokens, password hashing, and the cookie auth middleware
//! - `db`: Connection pool and migration runner
//! - `models`: Database models (Company, User, Queue, Ticket)
//! - `sequence`: Ticket sequence engine and status transitions

pub mod auth;
pub mod db;
pub mod models;
pub mod sequence;
