//! Application state and router builder
//!
//! Defines the shared application state and builds the Axum router with all
//! routes and middleware.
//!
//! # Example
//!
//! ```no_run
//! use filaq_api::{app::AppState, config::Config};
//! use sqlx::PgPool;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = PgPool::connect(&config.database.url).await?;
//! let state = AppState::new(pool, config);
//! let app = filaq_api::app::build_router(state);
//! # Ok(())
//! # }
//! ```

use crate::middleware::security::security_headers;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use filaq_shared::auth::middleware::{authenticate, AuthError};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

/// Shared application state
///
/// Cloned into each request handler via Axum's `State` extractor; `Arc`
/// keeps the clone cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                                 # Health check (public)
/// ├── /auth/
/// │   ├── POST /signup                        # Register company + first user
/// │   ├── POST /login                         # Set session cookie
/// │   ├── POST /logout                        # Clear session cookie
/// │   └── GET  /me                            # Current user (cookie)
/// ├── /queues/                                # Staff dashboard (cookie)
/// │   ├── POST /                              # Create queue
/// │   ├── GET  /                              # List queues + waiting counts
/// │   ├── GET  /:id                           # Queue detail
/// │   ├── POST /:id/generate-ticket           # Issue next ticket
/// │   └── POST /:id/next                      # Call next waiting ticket
/// ├── /tickets/
/// │   └── POST /:id/finish                    # Finish called ticket (cookie)
/// └── /public/                                # Kiosk + display (no auth)
///     ├── GET  /queue/:id                     # Queue info
///     ├── POST /queue/:id/generate-ticket     # Self-service ticket
///     └── GET  /display/:companyId            # Display board
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public surface: health, signup/login/logout, kiosk and display board.
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/public/queue/:queue_id", get(routes::public::queue_info))
        .route(
            "/public/queue/:queue_id/generate-ticket",
            post(routes::public::generate_ticket),
        )
        .route(
            "/public/display/:company_id",
            get(routes::public::display_board),
        );

    // Staff surface: requires the session cookie.
    let staff_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route(
            "/queues",
            post(routes::queues::create_queue).get(routes::queues::list_queues),
        )
        .route("/queues/:queue_id", get(routes::queues::queue_detail))
        .route(
            "/queues/:queue_id/generate-ticket",
            post(routes::queues::generate_ticket),
        )
        .route("/queues/:queue_id/next", post(routes::queues::call_next))
        .route(
            "/tickets/:ticket_id/finish",
            post(routes::tickets::finish_ticket),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            cookie_auth_layer,
        ));

    // Cookie credentials forbid a wildcard origin outside development.
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(staff_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(
            state.config.api.production,
            security_headers,
        ))
        .with_state(state)
}

/// Cookie authentication middleware layer
///
/// Validates the session cookie and injects an `AuthContext` into request
/// extensions for the staff handlers.
async fn cookie_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret())?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
