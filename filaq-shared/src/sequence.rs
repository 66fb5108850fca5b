//! Ticket sequence engine
//!
//! Owns the two invariants nothing else in the system is allowed to touch:
//!
//! 1. Each queue's next ticket number is assigned exactly once,
//!    monotonically, even under concurrent generation requests.
//! 2. Status transitions follow WAITING → IN_PROGRESS → DONE, with
//!    `called_at` and `finished_at` each stamped exactly once.
//!
//! Mutual exclusion comes from the store, not from in-process locking:
//! callers may be spread across multiple server instances, so an in-memory
//! mutex would protect nothing. `issue_ticket` takes a row lock on the queue
//! (`FOR UPDATE`) for the duration of its read-increment-insert transaction;
//! `call_next` claims the oldest WAITING ticket with `FOR UPDATE SKIP
//! LOCKED`, so two concurrent calls claim two different tickets; `finish`
//! is a single guarded UPDATE keyed on the current status.
//!
//! Write conflicts are not retried here; they bubble to the caller as
//! [`SequenceError::Database`].
//!
//! # Example
//!
//! ```no_run
//! use filaq_shared::sequence;
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, queue_id: Uuid) -> Result<(), sequence::SequenceError> {
//! let issued = sequence::issue_ticket(&pool, queue_id).await?;
//! println!("issued {}", issued.ticket.display_number);
//!
//! let called = sequence::call_next(&pool, queue_id).await?;
//! let done = sequence::finish(&pool, called.id).await?;
//! assert!(done.finished_at.is_some());
//! # Ok(())
//! # }
//! ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ticket::{Ticket, TicketStatus};

/// Error type for sequence engine operations
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// Queue does not exist
    #[error("queue not found")]
    QueueNotFound,

    /// Ticket does not exist
    #[error("ticket not found")]
    TicketNotFound,

    /// No WAITING ticket in the queue
    #[error("no ticket is waiting in this queue")]
    NoWaitingTicket,

    /// Operation is not legal for the ticket's current status
    #[error("ticket is {}, expected {}", current.as_str(), expected.as_str())]
    InvalidState {
        /// Status the ticket actually has
        current: TicketStatus,
        /// Status the operation requires
        expected: TicketStatus,
    },

    /// Underlying store failure (including unretried write conflicts)
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A freshly issued ticket with its queue and company names attached
///
/// The names are the values read under the queue lock, for callers that
/// render a ticket stub without a second round trip.
#[derive(Debug, Clone)]
pub struct IssuedTicket {
    /// The created ticket, status WAITING
    pub ticket: Ticket,

    /// Name of the queue the ticket was issued in
    pub queue_name: String,

    /// Name of the company owning the queue
    pub company_name: String,
}

/// Builds the human-facing label: prefix + number zero-padded to 3 digits
///
/// Padding never truncates: number 1000 with prefix "A" is "A1000".
pub fn display_number(prefix: &str, number: i32) -> String {
    format!("{prefix}{number:03}")
}

#[derive(sqlx::FromRow)]
struct LockedQueue {
    id: Uuid,
    name: String,
    prefix: String,
    current_number: i32,
    company_name: String,
}

/// Issues the next ticket for a queue
///
/// One transaction: lock the queue row, increment `current_number`, insert
/// the ticket carrying the new number. Two concurrent callers serialize on
/// the row lock, so they can never observe or write the same number; the
/// `UNIQUE (queue_id, number)` constraint would reject a duplicate even if
/// they somehow did.
///
/// # Errors
///
/// - [`SequenceError::QueueNotFound`] if the queue does not exist
/// - [`SequenceError::Database`] on store failure
pub async fn issue_ticket(pool: &PgPool, queue_id: Uuid) -> Result<IssuedTicket, SequenceError> {
    let mut tx = pool.begin().await?;

    let queue = sqlx::query_as::<_, LockedQueue>(
        r#"
        SELECT q.id, q.name, q.prefix, q.current_number,
               c.name AS company_name
        FROM queues q
        JOIN companies c ON c.id = q.company_id
        WHERE q.id = $1
        FOR UPDATE OF q
        "#,
    )
    .bind(queue_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(SequenceError::QueueNotFound)?;

    let number = queue.current_number + 1;

    sqlx::query(
        r#"
        UPDATE queues
        SET current_number = $2,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(queue.id)
    .bind(number)
    .execute(&mut *tx)
    .await?;

    let ticket = sqlx::query_as::<_, Ticket>(
        r#"
        INSERT INTO tickets (queue_id, number, display_number, status)
        VALUES ($1, $2, $3, 'waiting')
        RETURNING id, queue_id, number, display_number, status,
                  created_at, called_at, finished_at
        "#,
    )
    .bind(queue.id)
    .bind(number)
    .bind(display_number(&queue.prefix, number))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(
        queue_id = %queue.id,
        display_number = %ticket.display_number,
        "Issued ticket"
    );

    Ok(IssuedTicket {
        ticket,
        queue_name: queue.name,
        company_name: queue.company_name,
    })
}

/// Calls the next ticket in a queue: oldest WAITING → IN_PROGRESS
///
/// Selection is strict FIFO by assigned number. `SKIP LOCKED` makes the
/// claim race-free: a ticket being claimed by a concurrent call is invisible
/// here, so each call claims a distinct ticket. Deliberately does NOT check
/// whether the queue already has a ticket IN_PROGRESS — a company may staff
/// several counters on one queue.
///
/// # Errors
///
/// - [`SequenceError::NoWaitingTicket`] if nothing is waiting; nothing is
///   mutated in that case
/// - [`SequenceError::Database`] on store failure
pub async fn call_next(pool: &PgPool, queue_id: Uuid) -> Result<Ticket, SequenceError> {
    let mut tx = pool.begin().await?;

    let claimed: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT id
        FROM tickets
        WHERE queue_id = $1 AND status = 'waiting'
        ORDER BY number ASC
        LIMIT 1
        FOR UPDATE SKIP LOCKED
        "#,
    )
    .bind(queue_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (ticket_id,) = claimed.ok_or(SequenceError::NoWaitingTicket)?;

    let ticket = sqlx::query_as::<_, Ticket>(
        r#"
        UPDATE tickets
        SET status = 'in_progress',
            called_at = NOW()
        WHERE id = $1 AND status = 'waiting'
        RETURNING id, queue_id, number, display_number, status,
                  created_at, called_at, finished_at
        "#,
    )
    .bind(ticket_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(
        queue_id = %queue_id,
        display_number = %ticket.display_number,
        "Called ticket"
    );

    Ok(ticket)
}

/// Finishes a ticket: IN_PROGRESS → DONE
///
/// A single guarded UPDATE keyed on the current status; a concurrent finish
/// of the same ticket loses the race and reports the state error instead of
/// stamping `finished_at` twice. Tenant scoping is the caller's job — check
/// the ticket belongs to the caller's company before invoking this.
///
/// # Errors
///
/// - [`SequenceError::TicketNotFound`] if the ticket does not exist
/// - [`SequenceError::InvalidState`] if the ticket is not IN_PROGRESS; the
///   ticket is left unchanged
/// - [`SequenceError::Database`] on store failure
pub async fn finish(pool: &PgPool, ticket_id: Uuid) -> Result<Ticket, SequenceError> {
    let updated = sqlx::query_as::<_, Ticket>(
        r#"
        UPDATE tickets
        SET status = 'done',
            finished_at = NOW()
        WHERE id = $1 AND status = 'in_progress'
        RETURNING id, queue_id, number, display_number, status,
                  created_at, called_at, finished_at
        "#,
    )
    .bind(ticket_id)
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(ticket) => {
            tracing::debug!(display_number = %ticket.display_number, "Finished ticket");
            Ok(ticket)
        }
        None => {
            // Distinguish a missing ticket from one in the wrong state.
            let current = Ticket::find_by_id(pool, ticket_id)
                .await?
                .ok_or(SequenceError::TicketNotFound)?;

            Err(SequenceError::InvalidState {
                current: current.status,
                expected: TicketStatus::InProgress,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_number_pads_to_three_digits() {
        assert_eq!(display_number("A", 1), "A001");
        assert_eq!(display_number("A", 7), "A007");
        assert_eq!(display_number("A", 42), "A042");
        assert_eq!(display_number("B", 999), "B999");
    }

    #[test]
    fn test_display_number_never_truncates() {
        assert_eq!(display_number("A", 1000), "A1000");
        assert_eq!(display_number("A", 12345), "A12345");
    }

    #[test]
    fn test_display_number_multi_char_prefix() {
        assert_eq!(display_number("XYZ", 3), "XYZ003");
    }

    #[test]
    fn test_invalid_state_message_names_both_statuses() {
        let err = SequenceError::InvalidState {
            current: TicketStatus::Waiting,
            expected: TicketStatus::InProgress,
        };
        assert_eq!(err.to_string(), "ticket is WAITING, expected IN_PROGRESS");
    }
}
