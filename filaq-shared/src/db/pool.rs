//! Database connection pool
//!
//! PostgreSQL pool built on sqlx. Connecting pings the database, so a bad
//! `DATABASE_URL` fails at startup instead of on the first request.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// Connection pool settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Upper bound on open connections
    pub max_connections: u32,

    /// Idle connections kept warm
    pub min_connections: u32,

    /// How long a request may wait for a free connection
    pub acquire_timeout: Duration,

    /// Idle time after which a connection is closed
    pub idle_timeout: Option<Duration>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
        }
    }
}

impl DatabaseConfig {
    /// Opens the pool and verifies the database answers
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the database is unreachable,
    /// or the ping fails
    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        info!(
            max_connections = self.max_connections,
            min_connections = self.min_connections,
            "Opening database pool"
        );

        let mut options = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout);

        if let Some(idle) = self.idle_timeout {
            options = options.idle_timeout(idle);
        }

        let pool = options.connect(&self.url).await?;
        ping(&pool).await?;

        info!("Database pool ready");
        Ok(pool)
    }
}

/// Round-trips a trivial query to confirm the database is reachable
///
/// # Errors
///
/// Returns the underlying error if the query fails
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Drains and closes the pool on shutdown
pub async fn close_pool(pool: PgPool) {
    info!("Closing database pool");
    pool.close().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = DatabaseConfig::default();

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.acquire_timeout, Duration::from_secs(30));
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(600)));
        assert!(config.url.is_empty());
    }
}
