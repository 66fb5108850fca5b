//! Common test utilities for integration tests
//!
//! Shared infrastructure:
//! - Test database setup (live Postgres from `DATABASE_URL`, migrated)
//! - Seeded company and staff user
//! - Session cookie generation
//! - Request helpers driving the router through `tower::Service`

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use filaq_api::app::{build_router, AppState};
use filaq_api::config::Config;
use filaq_shared::auth::jwt::{sign, Claims};
use filaq_shared::auth::middleware::AUTH_COOKIE;
use filaq_shared::models::company::{Company, CreateCompany};
use filaq_shared::models::queue::{CreateQueue, Queue};
use filaq_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub company: Company,
    pub user: User,
    pub token: String,
}

impl TestContext {
    /// Creates a new test context with a migrated database and a seeded
    /// company + staff user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        filaq_shared::db::migrations::run_migrations(&db).await?;

        let company = Company::create(
            &db,
            CreateCompany {
                name: format!("Test Company {}", Uuid::new_v4()),
            },
        )
        .await?;

        let user = User::create(
            &db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                // Tests that exercise login seed their own real hash.
                password_hash: "test_hash".to_string(),
                company_id: company.id,
            },
        )
        .await?;

        let claims = Claims::new(user.id, company.id);
        let token = sign(&claims, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            company,
            user,
            token,
        })
    }

    /// Returns the session Cookie header value
    pub fn auth_cookie(&self) -> String {
        format!("{}={}", AUTH_COOKIE, self.token)
    }

    /// Creates a queue owned by the context's company
    pub async fn create_queue(&self, name: &str, prefix: &str) -> anyhow::Result<Queue> {
        let queue = Queue::create(
            &self.db,
            CreateQueue {
                company_id: self.company.id,
                name: name.to_string(),
                prefix: prefix.to_string(),
            },
        )
        .await?;

        Ok(queue)
    }

    /// Sends a request through the router, optionally authenticated
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
        authed: bool,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if authed {
            builder = builder.header(header::COOKIE, self.auth_cookie());
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.app.clone().call(request).await.unwrap()
    }

    /// Cleans up test data (cascades to users, queues, and tickets)
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(self.company.id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Reads a response body as JSON, panicking with the body text on failure
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Invalid JSON body ({}): {}", e, String::from_utf8_lossy(&bytes)))
}

/// Asserts a status, printing the body when it differs
pub async fn assert_status(response: Response, expected: StatusCode) -> serde_json::Value {
    let status = response.status();
    let json = body_json(response).await;
    assert_eq!(status, expected, "unexpected status, body: {}", json);
    json
}
