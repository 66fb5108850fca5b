//! Company model and database operations
//!
//! Companies are the tenant root: every user, queue, and (through its queue)
//! ticket belongs to exactly one company. A company is created once at
//! signup and is immutable afterwards.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE companies (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(255) NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Company model representing a registered business
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    /// Unique company ID (UUID v4)
    pub id: Uuid,

    /// Business name shown on the public display board
    pub name: String,

    /// When the company registered
    pub created_at: DateTime<Utc>,

    /// When the company was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    /// Business name
    pub name: String,
}

impl Company {
    /// Creates a new company
    ///
    /// Takes any executor so signup can run it inside the same transaction
    /// that creates the first user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateCompany,
    ) -> Result<Self, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .fetch_one(executor)
        .await?;

        Ok(company)
    }

    /// Finds a company by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(company)
    }
}
