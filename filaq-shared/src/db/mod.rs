//! Database utilities
//!
//! - `pool`: PostgreSQL connection pool
//! - `migrations`: sqlx migration runner

pub mod migrations;
pub mod pool;
