//! # Filaq API Server
//!
//! Multi-tenant ticket-queueing backend. Companies register, create
//! prefix-tagged queues, and issue sequential tickets; staff call and finish
//! tickets from the dashboard while the public display board polls the
//! unauthenticated endpoints.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/filaq JWT_SECRET=$(openssl rand -hex 32) \
//!     cargo run -p filaq-api
//! ```

use filaq_api::app::{build_router, AppState};
use filaq_api::config::Config;
use filaq_shared::db::migrations::run_migrations;
use filaq_shared::db::pool::{close_pool, DatabaseConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filaq_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Filaq API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    }
    .connect()
    .await?;

    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
