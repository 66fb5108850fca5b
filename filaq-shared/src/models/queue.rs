//! Queue model and database operations
//!
//! A queue is a named, prefix-tagged ticket sequence belonging to one
//! company. The prefix is normalized to upper case on creation and must be
//! unique within the company (enforced by `queues_company_prefix_key`).
//!
//! `current_number` is the sequence counter. It only ever increases, by
//! exactly one, inside the transaction that also inserts the dependent
//! ticket — see [`crate::sequence`]. Nothing else may write it.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE queues (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
//!     name VARCHAR(255) NOT NULL,
//!     prefix VARCHAR(10) NOT NULL,
//!     current_number INTEGER NOT NULL DEFAULT 0,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     CONSTRAINT queues_company_prefix_key UNIQUE (company_id, prefix)
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Queue model representing one ticket sequence
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Queue {
    /// Unique queue ID (UUID v4)
    pub id: Uuid,

    /// Company this queue belongs to
    pub company_id: Uuid,

    /// Display name (e.g. "Front desk")
    pub name: String,

    /// Ticket label prefix, upper case, unique within the company
    pub prefix: String,

    /// Last assigned sequence number; 0 before any ticket is issued
    pub current_number: i32,

    /// When the queue was created
    pub created_at: DateTime<Utc>,

    /// When the queue was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQueue {
    /// Company the queue belongs to
    pub company_id: Uuid,

    /// Display name
    pub name: String,

    /// Label prefix; normalized to upper case before storage
    pub prefix: String,
}

/// Queue row joined with its count of WAITING tickets
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct QueueWithWaiting {
    /// The queue itself
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub queue: Queue,

    /// Number of tickets currently in WAITING
    pub waiting_count: i64,
}

/// Queue row joined with the owning company's name
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct QueueWithCompany {
    /// The queue itself
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub queue: Queue,

    /// Owning company's name
    pub company_name: String,
}

impl Queue {
    /// Creates a new queue with a normalized (upper-cased, trimmed) prefix
    ///
    /// # Errors
    ///
    /// A duplicate prefix within the same company violates
    /// `queues_company_prefix_key` and surfaces as a database error; callers
    /// map that to their conflict error. Checking first and inserting after
    /// would leave a race window, the constraint does not.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateQueue,
    ) -> Result<Self, sqlx::Error> {
        let prefix = data.prefix.trim().to_uppercase();

        let queue = sqlx::query_as::<_, Queue>(
            r#"
            INSERT INTO queues (company_id, name, prefix)
            VALUES ($1, $2, $3)
            RETURNING id, company_id, name, prefix, current_number,
                      created_at, updated_at
            "#,
        )
        .bind(data.company_id)
        .bind(data.name)
        .bind(prefix)
        .fetch_one(executor)
        .await?;

        Ok(queue)
    }

    /// Finds a queue by ID with tenant isolation
    pub async fn find_by_id_and_company(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let queue = sqlx::query_as::<_, Queue>(
            r#"
            SELECT id, company_id, name, prefix, current_number,
                   created_at, updated_at
            FROM queues
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(queue)
    }

    /// Finds a queue by ID together with the owning company's name
    pub async fn find_by_id_with_company(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<QueueWithCompany>, sqlx::Error> {
        let queue = sqlx::query_as::<_, QueueWithCompany>(
            r#"
            SELECT q.id, q.company_id, q.name, q.prefix, q.current_number,
                   q.created_at, q.updated_at,
                   c.name AS company_name
            FROM queues q
            JOIN companies c ON c.id = q.company_id
            WHERE q.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(queue)
    }

    /// Lists a company's queues, newest first, each with its WAITING count
    pub async fn list_by_company_with_waiting(
        pool: &PgPool,
        company_id: Uuid,
    ) -> Result<Vec<QueueWithWaiting>, sqlx::Error> {
        let queues = sqlx::query_as::<_, QueueWithWaiting>(
            r#"
            SELECT q.id, q.company_id, q.name, q.prefix, q.current_number,
                   q.created_at, q.updated_at,
                   COUNT(t.id) FILTER (WHERE t.status = 'waiting') AS waiting_count
            FROM queues q
            LEFT JOIN tickets t ON t.queue_id = q.id
            WHERE q.company_id = $1
            GROUP BY q.id
            ORDER BY q.created_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(pool)
        .await?;

        Ok(queues)
    }
}
