//! Ticket model and database operations
//!
//! A ticket is one customer's position in a queue, identified by a padded
//! display number and tracked through its lifecycle.
//!
//! # State Machine
//!
//! ```text
//! WAITING → IN_PROGRESS → DONE
//! ```
//!
//! Tickets are created in WAITING by the sequence engine, move to
//! IN_PROGRESS when a staff member calls them (`called_at` stamped exactly
//! once), and to DONE when the service ends (`finished_at` stamped exactly
//! once). No transition goes backwards and DONE is terminal; there is no
//! cancellation state.
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE ticket_status AS ENUM ('waiting', 'in_progress', 'done');
//!
//! CREATE TABLE tickets (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     queue_id UUID NOT NULL REFERENCES queues(id) ON DELETE CASCADE,
//!     number INTEGER NOT NULL,
//!     display_number VARCHAR(20) NOT NULL,
//!     status ticket_status NOT NULL DEFAULT 'waiting',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     called_at TIMESTAMPTZ,
//!     finished_at TIMESTAMPTZ,
//!     CONSTRAINT tickets_queue_number_key UNIQUE (queue_id, number)
//! );
//! ```
//!
//! `number` is the raw sequence value assigned by the engine; the unique
//! constraint makes reuse impossible and `ORDER BY number` is exact issue
//! order within a queue. Writes that change `status` live in
//! [`crate::sequence`]; this module only reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Ticket lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Issued, waiting to be called
    Waiting,

    /// Called by staff, currently being served
    InProgress,

    /// Service finished
    Done,
}

impl TicketStatus {
    /// Converts status to its wire/display form
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Waiting => "WAITING",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::Done => "DONE",
        }
    }

    /// Checks if the status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Done)
    }

    /// Checks if a transition to `target` is legal
    pub fn can_transition_to(&self, target: TicketStatus) -> bool {
        matches!(
            (self, target),
            (TicketStatus::Waiting, TicketStatus::InProgress)
                | (TicketStatus::InProgress, TicketStatus::Done)
        )
    }
}

/// Ticket model representing one queue position
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    /// Unique ticket ID (UUID v4)
    pub id: Uuid,

    /// Queue this ticket belongs to
    pub queue_id: Uuid,

    /// Assigned sequence number, unique within the queue
    pub number: i32,

    /// Human-facing label: prefix + zero-padded number (e.g. "A007")
    pub display_number: String,

    /// Current lifecycle status
    pub status: TicketStatus,

    /// When the ticket was issued
    pub created_at: DateTime<Utc>,

    /// When the ticket was called (None while WAITING)
    pub called_at: Option<DateTime<Utc>>,

    /// When the service finished (None until DONE)
    pub finished_at: Option<DateTime<Utc>>,
}

/// Ticket row joined with its queue's name and prefix, for the display board
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TicketWithQueue {
    /// The ticket itself
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ticket: Ticket,

    /// Owning queue's display name
    pub queue_name: String,

    /// Owning queue's prefix
    pub queue_prefix: String,
}

const TICKET_COLUMNS: &str =
    "id, queue_id, number, display_number, status, created_at, called_at, finished_at";

impl Ticket {
    /// Finds a ticket by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1");
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(ticket)
    }

    /// Finds a ticket by ID with tenant isolation (via its queue's company)
    ///
    /// This is the method staff endpoints must use: a ticket outside the
    /// caller's company is indistinguishable from one that does not exist.
    pub async fn find_by_id_and_company(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT t.id, t.queue_id, t.number, t.display_number, t.status,
                   t.created_at, t.called_at, t.finished_at
            FROM tickets t
            JOIN queues q ON q.id = t.queue_id
            WHERE t.id = $1 AND q.company_id = $2
            "#,
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(ticket)
    }

    /// Lists a queue's WAITING tickets in issue order
    pub async fn list_waiting_by_queue(
        pool: &PgPool,
        queue_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets \
             WHERE queue_id = $1 AND status = 'waiting' \
             ORDER BY number ASC"
        );
        let tickets = sqlx::query_as::<_, Ticket>(&query)
            .bind(queue_id)
            .fetch_all(pool)
            .await?;

        Ok(tickets)
    }

    /// Lists a queue's IN_PROGRESS tickets in call order
    pub async fn list_in_progress_by_queue(
        pool: &PgPool,
        queue_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets \
             WHERE queue_id = $1 AND status = 'in_progress' \
             ORDER BY called_at ASC"
        );
        let tickets = sqlx::query_as::<_, Ticket>(&query)
            .bind(queue_id)
            .fetch_all(pool)
            .await?;

        Ok(tickets)
    }

    /// Lists a company's IN_PROGRESS tickets across all queues, in call order
    ///
    /// Feeds the "now serving" section of the display board.
    pub async fn list_in_progress_by_company(
        pool: &PgPool,
        company_id: Uuid,
    ) -> Result<Vec<TicketWithQueue>, sqlx::Error> {
        let tickets = sqlx::query_as::<_, TicketWithQueue>(
            r#"
            SELECT t.id, t.queue_id, t.number, t.display_number, t.status,
                   t.created_at, t.called_at, t.finished_at,
                   q.name AS queue_name, q.prefix AS queue_prefix
            FROM tickets t
            JOIN queues q ON q.id = t.queue_id
            WHERE q.company_id = $1 AND t.status = 'in_progress'
            ORDER BY t.called_at ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(pool)
        .await?;

        Ok(tickets)
    }

    /// Lists a company's most recently finished tickets, newest first
    ///
    /// Feeds the history section of the display board.
    pub async fn list_recent_done_by_company(
        pool: &PgPool,
        company_id: Uuid,
        limit: i64,
    ) -> Result<Vec<TicketWithQueue>, sqlx::Error> {
        let tickets = sqlx::query_as::<_, TicketWithQueue>(
            r#"
            SELECT t.id, t.queue_id, t.number, t.display_number, t.status,
                   t.created_at, t.called_at, t.finished_at,
                   q.name AS queue_name, q.prefix AS queue_prefix
            FROM tickets t
            JOIN queues q ON q.id = t.queue_id
            WHERE q.company_id = $1 AND t.status = 'done'
            ORDER BY t.finished_at DESC
            LIMIT $2
            "#,
        )
        .bind(company_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(tickets)
    }
}
