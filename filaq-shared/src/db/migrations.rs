//! Database migration runner
//!
//! Migrations live in this crate's `migrations/` directory as reversible
//! sqlx pairs (`{timestamp}_{name}.up.sql` / `.down.sql`) and are embedded
//! at compile time, so the binaries migrate themselves at startup and the
//! integration tests migrate their test database the same way.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if a migration fails to apply; already-applied
/// migrations are skipped
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
