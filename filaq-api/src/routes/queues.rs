//! Staff queue endpoints
//!
//! Everything here requires the session cookie and is scoped to the
//! authenticated company: a queue belonging to another tenant is a 404.
//!
//! # Endpoints
//!
//! - `POST /queues` - Create a queue
//! - `GET  /queues` - List queues with waiting counts
//! - `GET  /queues/:queue_id` - Queue detail with waiting/in-progress tickets
//! - `POST /queues/:queue_id/generate-ticket` - Issue the next ticket
//! - `POST /queues/:queue_id/next` - Call the oldest waiting ticket

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::tickets::TicketResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use filaq_shared::{
    auth::middleware::AuthContext,
    models::{
        queue::{CreateQueue, Queue, QueueWithWaiting},
        ticket::Ticket,
    },
    sequence,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Create queue request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQueueRequest {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Queue name is required"))]
    pub name: String,

    /// Ticket label prefix; letters and digits only, upper-cased on storage
    #[validate(
        length(min = 1, max = 10, message = "Prefix must be 1-10 characters"),
        custom(function = "validate_prefix", message = "Prefix must be letters and digits only")
    )]
    pub prefix: String,
}

fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    let trimmed = prefix.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("prefix"))
    }
}

/// Queue as it appears on the wire, with its waiting count
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueResponse {
    /// Queue ID
    pub id: Uuid,

    /// Owning company ID
    pub company_id: Uuid,

    /// Display name
    pub name: String,

    /// Ticket label prefix
    pub prefix: String,

    /// Last assigned sequence number
    pub current_number: i32,

    /// When the queue was created
    pub created_at: DateTime<Utc>,

    /// Number of tickets currently waiting
    pub waiting_count: i64,
}

impl From<QueueWithWaiting> for QueueResponse {
    fn from(row: QueueWithWaiting) -> Self {
        Self {
            id: row.queue.id,
            company_id: row.queue.company_id,
            name: row.queue.name,
            prefix: row.queue.prefix,
            current_number: row.queue.current_number,
            created_at: row.queue.created_at,
            waiting_count: row.waiting_count,
        }
    }
}

impl QueueResponse {
    fn from_new(queue: Queue) -> Self {
        Self {
            id: queue.id,
            company_id: queue.company_id,
            name: queue.name,
            prefix: queue.prefix,
            current_number: queue.current_number,
            created_at: queue.created_at,
            waiting_count: 0,
        }
    }
}

/// Queue detail response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueDetailResponse {
    /// The queue
    pub queue: QueueResponse,

    /// WAITING tickets in issue order
    pub waiting_tickets: Vec<TicketResponse>,

    /// IN_PROGRESS tickets in call order
    pub in_progress_tickets: Vec<TicketResponse>,
}

/// Create queue endpoint
///
/// The prefix is normalized to upper case; uniqueness within the company is
/// the `queues_company_prefix_key` constraint, surfaced as a 400 conflict.
///
/// # Errors
///
/// - `400 Bad Request`: Prefix already used by this company
/// - `401 Unauthorized`: Missing or invalid session cookie
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_queue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateQueueRequest>,
) -> ApiResult<(StatusCode, Json<QueueResponse>)> {
    req.validate()?;

    let queue = Queue::create(
        &state.db,
        CreateQueue {
            company_id: auth.company_id,
            name: req.name,
            prefix: req.prefix,
        },
    )
    .await?;

    tracing::info!(
        company_id = %auth.company_id,
        queue_id = %queue.id,
        prefix = %queue.prefix,
        "Queue created"
    );

    Ok((StatusCode::CREATED, Json(QueueResponse::from_new(queue))))
}

/// List queues endpoint
///
/// Returns the company's queues newest first, each with its count of
/// WAITING tickets for the dashboard tiles.
pub async fn list_queues(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<QueueResponse>>> {
    let queues = Queue::list_by_company_with_waiting(&state.db, auth.company_id).await?;

    Ok(Json(queues.into_iter().map(QueueResponse::from).collect()))
}

/// Queue detail endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid session cookie
/// - `404 Not Found`: Queue absent or belongs to another company
pub async fn queue_detail(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(queue_id): Path<Uuid>,
) -> ApiResult<Json<QueueDetailResponse>> {
    let queue = Queue::find_by_id_and_company(&state.db, queue_id, auth.company_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Queue not found".to_string()))?;

    let waiting = Ticket::list_waiting_by_queue(&state.db, queue_id).await?;
    let in_progress = Ticket::list_in_progress_by_queue(&state.db, queue_id).await?;

    let waiting_count = waiting.len() as i64;
    let mut queue = QueueResponse::from_new(queue);
    queue.waiting_count = waiting_count;

    Ok(Json(QueueDetailResponse {
        queue,
        waiting_tickets: waiting.into_iter().map(TicketResponse::from).collect(),
        in_progress_tickets: in_progress.into_iter().map(TicketResponse::from).collect(),
    }))
}

/// Generate ticket endpoint (staff)
///
/// Issues the queue's next sequential ticket via the sequence engine.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid session cookie
/// - `404 Not Found`: Queue absent or belongs to another company
/// - `500 Internal Server Error`: Database error
pub async fn generate_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(queue_id): Path<Uuid>,
) -> ApiResult<Json<TicketResponse>> {
    Queue::find_by_id_and_company(&state.db, queue_id, auth.company_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Queue not found".to_string()))?;

    let issued = sequence::issue_ticket(&state.db, queue_id).await?;

    tracing::info!(
        company_id = %auth.company_id,
        queue_id = %queue_id,
        display_number = %issued.ticket.display_number,
        "Ticket issued"
    );

    Ok(Json(issued.ticket.into()))
}

/// Call next endpoint
///
/// Transitions the oldest WAITING ticket to IN_PROGRESS. Does not check for
/// an already-serving ticket: one queue may feed several counters.
///
/// # Errors
///
/// - `400 Bad Request`: No ticket is waiting
/// - `401 Unauthorized`: Missing or invalid session cookie
/// - `404 Not Found`: Queue absent or belongs to another company
/// - `500 Internal Server Error`: Database error
pub async fn call_next(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(queue_id): Path<Uuid>,
) -> ApiResult<Json<TicketResponse>> {
    Queue::find_by_id_and_company(&state.db, queue_id, auth.company_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Queue not found".to_string()))?;

    let ticket = sequence::call_next(&state.db, queue_id).await?;

    tracing::info!(
        company_id = %auth.company_id,
        queue_id = %queue_id,
        display_number = %ticket.display_number,
        "Ticket called"
    );

    Ok(Json(ticket.into()))
}
