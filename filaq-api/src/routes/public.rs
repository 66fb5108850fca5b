//! Public endpoints
//!
//! The self-service kiosk and the waiting-room display board poll these
//! without any credential; they expose nothing a visitor in the room cannot
//! already see.
//!
//! # Endpoints
//!
//! - `GET  /public/queue/:queue_id` - Queue name/prefix and company
//! - `POST /public/queue/:queue_id/generate-ticket` - Self-service ticket
//! - `GET  /public/display/:company_id` - Now-serving and recent tickets

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::auth::CompanySummary,
    routes::tickets::TicketResponse,
};
use axum::{
    extract::{Path, State},
    Json,
};
use filaq_shared::{
    models::{
        company::Company,
        queue::Queue,
        ticket::{Ticket, TicketWithQueue},
    },
    sequence,
};
use serde::Serialize;
use uuid::Uuid;

/// How many finished tickets the display board's history shows
const RECENT_TICKETS: i64 = 5;

/// Public queue info response
#[derive(Debug, Serialize)]
pub struct PublicQueueResponse {
    /// Queue ID
    pub id: Uuid,

    /// Queue display name
    pub name: String,

    /// Ticket label prefix
    pub prefix: String,

    /// Owning company
    pub company: CompanySummary,
}

/// Public generate-ticket response
///
/// Carries the queue and company names so the kiosk can print a stub
/// without a second request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTicketResponse {
    /// The issued ticket
    pub ticket: TicketResponse,

    /// Queue display name
    pub queue_name: String,

    /// Company name
    pub company_name: String,
}

/// A display-board entry: ticket plus its queue's name and prefix
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardTicket {
    /// The ticket
    #[serde(flatten)]
    pub ticket: TicketResponse,

    /// Owning queue
    pub queue: BoardQueue,
}

/// Queue name/prefix pair on a board entry
#[derive(Debug, Serialize)]
pub struct BoardQueue {
    /// Queue display name
    pub name: String,

    /// Ticket label prefix
    pub prefix: String,
}

impl From<TicketWithQueue> for BoardTicket {
    fn from(row: TicketWithQueue) -> Self {
        Self {
            ticket: row.ticket.into(),
            queue: BoardQueue {
                name: row.queue_name,
                prefix: row.queue_prefix,
            },
        }
    }
}

/// Display board response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayBoardResponse {
    /// The company whose board this is
    pub company: CompanySummary,

    /// Tickets being served right now, oldest call first
    pub current_tickets: Vec<BoardTicket>,

    /// Recently finished tickets, newest first
    pub recent_tickets: Vec<BoardTicket>,
}

/// Public queue info endpoint
///
/// # Errors
///
/// - `404 Not Found`: Queue does not exist
pub async fn queue_info(
    State(state): State<AppState>,
    Path(queue_id): Path<Uuid>,
) -> ApiResult<Json<PublicQueueResponse>> {
    let row = Queue::find_by_id_with_company(&state.db, queue_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Queue not found".to_string()))?;

    Ok(Json(PublicQueueResponse {
        id: row.queue.id,
        name: row.queue.name,
        prefix: row.queue.prefix,
        company: CompanySummary {
            id: row.queue.company_id,
            name: row.company_name,
        },
    }))
}

/// Public generate-ticket endpoint
///
/// Same sequence engine call as the staff variant; the only difference is
/// the absence of a tenant check, since the visitor has no tenant.
///
/// # Errors
///
/// - `404 Not Found`: Queue does not exist
/// - `500 Internal Server Error`: Database error
pub async fn generate_ticket(
    State(state): State<AppState>,
    Path(queue_id): Path<Uuid>,
) -> ApiResult<Json<PublicTicketResponse>> {
    let issued = sequence::issue_ticket(&state.db, queue_id).await?;

    tracing::info!(
        queue_id = %queue_id,
        display_number = %issued.ticket.display_number,
        "Kiosk ticket issued"
    );

    Ok(Json(PublicTicketResponse {
        ticket: issued.ticket.into(),
        queue_name: issued.queue_name,
        company_name: issued.company_name,
    }))
}

/// Display board endpoint
///
/// # Errors
///
/// - `404 Not Found`: Company does not exist
pub async fn display_board(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Json<DisplayBoardResponse>> {
    let company = Company::find_by_id(&state.db, company_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    let current = Ticket::list_in_progress_by_company(&state.db, company_id).await?;
    let recent = Ticket::list_recent_done_by_company(&state.db, company_id, RECENT_TICKETS).await?;

    Ok(Json(DisplayBoardResponse {
        company: CompanySummary {
            id: company.id,
            name: company.name,
        },
        current_tickets: current.into_iter().map(BoardTicket::from).collect(),
        recent_tickets: recent.into_iter().map(BoardTicket::from).collect(),
    }))
}
