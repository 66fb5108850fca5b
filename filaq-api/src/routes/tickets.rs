//! Staff ticket endpoints
//!
//! A single operation lives here: finishing a called ticket. Issuing and
//! calling are queue-scoped and live in `routes::queues`.
//!
//! # Endpoints
//!
//! - `POST /tickets/:ticket_id/finish` - Transition IN_PROGRESS → DONE

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use filaq_shared::{
    auth::middleware::AuthContext,
    models::ticket::{Ticket, TicketStatus},
    sequence,
};
use serde::Serialize;
use uuid::Uuid;

/// Ticket as it appears on the wire
///
/// The polling pages expect camelCase fields and upper-case status values.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    /// Ticket ID
    pub id: Uuid,

    /// Owning queue ID
    pub queue_id: Uuid,

    /// Assigned sequence number
    pub number: i32,

    /// Human-facing label (e.g. "A007")
    pub display_number: String,

    /// Lifecycle status (WAITING / IN_PROGRESS / DONE)
    pub status: TicketStatus,

    /// When the ticket was issued
    pub created_at: DateTime<Utc>,

    /// When the ticket was called
    #[serde(skip_serializing_if = "Option::is_none")]
    pub called_at: Option<DateTime<Utc>>,

    /// When the service finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            queue_id: ticket.queue_id,
            number: ticket.number,
            display_number: ticket.display_number,
            status: ticket.status,
            created_at: ticket.created_at,
            called_at: ticket.called_at,
            finished_at: ticket.finished_at,
        }
    }
}

/// Finish ticket endpoint
///
/// Tenant scoping comes first: a ticket outside the caller's company is a
/// 404, indistinguishable from one that does not exist. The transition
/// itself is the engine's guarded update, so a concurrent finish of the
/// same ticket loses cleanly instead of double-stamping `finished_at`.
///
/// # Errors
///
/// - `400 Bad Request`: Ticket is not IN_PROGRESS
/// - `401 Unauthorized`: Missing or invalid session cookie
/// - `404 Not Found`: Ticket absent or belongs to another company
/// - `500 Internal Server Error`: Database error
pub async fn finish_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(ticket_id): Path<Uuid>,
) -> ApiResult<Json<TicketResponse>> {
    Ticket::find_by_id_and_company(&state.db, ticket_id, auth.company_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;

    let ticket = sequence::finish(&state.db, ticket_id).await?;

    tracing::info!(
        company_id = %auth.company_id,
        display_number = %ticket.display_number,
        "Ticket finished"
    );

    Ok(Json(ticket.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_response_wire_format() {
        let now = Utc::now();
        let response = TicketResponse {
            id: Uuid::new_v4(),
            queue_id: Uuid::new_v4(),
            number: 7,
            display_number: "A007".to_string(),
            status: TicketStatus::Waiting,
            created_at: now,
            called_at: None,
            finished_at: None,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["displayNumber"], "A007");
        assert_eq!(json["status"], "WAITING");
        // Unset timestamps are omitted, not null.
        assert!(json.get("calledAt").is_none());
        assert!(json.get("finishedAt").is_none());
    }
}
