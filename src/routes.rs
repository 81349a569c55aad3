//! API routes.
//!
//! Thin translation between HTTP and the synchronizer: extract, delegate,
//! map the error taxonomy onto status codes. Validation problems are 400,
//! unknown tickets 404, and remote-tracker failures surface as 502 only on
//! the routes that proxy the tracker directly; the write-through routes
//! never fail on remote errors.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::error::ParkdeskError;
use crate::remote::{IssueTracker, RemoteLabel};
use crate::stats::Stats;
use crate::sync::{NewTicket, RemotePage, Synchronizer, TicketPatch};
use crate::types::{Comment, Ticket};

type SyncState<T> = Arc<Synchronizer<T>>;
type Rejection = (StatusCode, Json<ErrorBody>);

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct TicketsResponse {
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub ok: bool,
    pub id: String,
    pub ticket: Ticket,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub ok: bool,
    pub ticket: Ticket,
}

#[derive(Debug, Deserialize)]
pub struct NewCommentBody {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub ok: bool,
    pub comment: Comment,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: Stats,
}

#[derive(Debug, Deserialize)]
pub struct RemoteListParams {
    pub labels: Option<String>,
    pub state: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LabelsResponse {
    pub labels: Vec<RemoteLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn reject(err: ParkdeskError) -> Rejection {
    let status = match &err {
        ParkdeskError::Validation(_)
        | ParkdeskError::InvalidState(_)
        | ParkdeskError::InvalidType(_)
        | ParkdeskError::InvalidPriority(_) => StatusCode::BAD_REQUEST,
        ParkdeskError::TicketNotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_remote() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("{err}");
    }
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

pub fn router<T: IssueTracker + 'static>(sync: SyncState<T>) -> Router {
    Router::new()
        .route(
            "/api/tickets",
            get(list_tickets::<T>).post(create_ticket::<T>),
        )
        .route(
            "/api/tickets/:id",
            get(show_ticket::<T>).patch(update_ticket::<T>),
        )
        .route("/api/tickets/:id/comments", post(add_comment::<T>))
        .route("/api/dashboard", get(dashboard::<T>))
        .route("/api/gitlab/tickets", get(remote_tickets::<T>))
        .route("/api/gitlab/labels", get(remote_labels::<T>))
        .with_state(sync)
}

async fn list_tickets<T: IssueTracker>(State(sync): State<SyncState<T>>) -> Json<TicketsResponse> {
    Json(TicketsResponse {
        tickets: sync.list_merged().await,
    })
}

async fn create_ticket<T: IssueTracker>(
    State(sync): State<SyncState<T>>,
    Json(input): Json<NewTicket>,
) -> Result<(StatusCode, Json<CreateResponse>), Rejection> {
    let ticket = sync.create_and_sync(input).await.map_err(reject)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            ok: true,
            id: ticket.id.clone(),
            ticket,
        }),
    ))
}

async fn show_ticket<T: IssueTracker>(
    State(sync): State<SyncState<T>>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, Rejection> {
    sync.get(&id).map(Json).map_err(reject)
}

async fn update_ticket<T: IssueTracker>(
    State(sync): State<SyncState<T>>,
    Path(id): Path<String>,
    Json(patch): Json<TicketPatch>,
) -> Result<Json<TicketResponse>, Rejection> {
    let ticket = sync.update_ticket(&id, patch).await.map_err(reject)?;
    Ok(Json(TicketResponse { ok: true, ticket }))
}

async fn add_comment<T: IssueTracker>(
    State(sync): State<SyncState<T>>,
    Path(id): Path<String>,
    Json(body): Json<NewCommentBody>,
) -> Result<Json<CommentResponse>, Rejection> {
    let comment = sync
        .add_comment(&id, body.author, &body.text)
        .map_err(reject)?;
    Ok(Json(CommentResponse { ok: true, comment }))
}

async fn dashboard<T: IssueTracker>(State(sync): State<SyncState<T>>) -> Json<DashboardResponse> {
    Json(DashboardResponse {
        stats: sync.dashboard().await,
    })
}

async fn remote_tickets<T: IssueTracker>(
    State(sync): State<SyncState<T>>,
    Query(params): Query<RemoteListParams>,
) -> Result<Json<RemotePage>, Rejection> {
    sync.remote_page(params.labels, params.state, params.page.unwrap_or(1))
        .await
        .map(Json)
        .map_err(reject)
}

// Degrades to an empty list with the error attached, matching the consumer's
// expectation that the label picker still renders.
async fn remote_labels<T: IssueTracker>(
    State(sync): State<SyncState<T>>,
) -> Json<LabelsResponse> {
    match sync.remote_labels().await {
        Ok(labels) => Json(LabelsResponse {
            labels,
            error: None,
        }),
        Err(e) => Json(LabelsResponse {
            labels: Vec::new(),
            error: Some(e.to_string()),
        }),
    }
}
