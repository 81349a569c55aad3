//! Ticket/issue synchronizer.
//!
//! Orchestrates the merged read (remote partitions unioned with local
//! tickets) and the write-through paths. The local store is the source of
//! truth: remote mirroring is a best-effort side effect whose outcome is
//! recorded in the ticket's sync descriptor, never surfaced as an operation
//! failure.

use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::error::{ParkdeskError, Result};
use crate::mapper;
use crate::remote::{IssueQuery, IssueTracker, Page, RemoteIssue, RemoteLabel, RemoteState};
use crate::stats::{summarize, Stats};
use crate::store::TicketStore;
use crate::types::{
    truncate_chars, Comment, SyncInfo, Ticket, TicketPriority, TicketState, TicketType,
    MAX_AUTHOR_LENGTH, MAX_COMMENT_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_FIELD_LENGTH,
    MAX_TITLE_LENGTH,
};

const LIST_PER_PAGE: u32 = 50;
const DASHBOARD_PER_PAGE: u32 = 100;
const DEFAULT_AUTHOR: &str = "Anonymous";

/// Input for ticket creation. Type and priority arrive as free-form strings
/// and are parsed at this boundary (legacy P1-P4 priorities included).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    #[serde(default)]
    pub service: String,
    #[serde(rename = "type", default)]
    pub ticket_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub affected_resource: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// Partial update: any subset of the mutable fields. State values are
/// restricted to the four-state enum and priority to the canonical scale
/// (legacy P1-P4 accepted); both are parsed before anything is applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    pub state: Option<String>,
    pub priority: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub affected_resource: Option<String>,
    pub contact: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// One page of raw remote issues, for the pass-through endpoint.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePage {
    pub items: Vec<RemoteIssue>,
    pub page: u32,
    pub next_page: Option<u32>,
    pub total: u64,
}

pub struct Synchronizer<T: IssueTracker> {
    store: Arc<TicketStore>,
    tracker: T,
    project_id: Option<String>,
}

impl<T: IssueTracker> Synchronizer<T> {
    pub fn new(store: Arc<TicketStore>, tracker: T, project_id: Option<String>) -> Self {
        Self {
            store,
            tracker,
            project_id,
        }
    }

    pub fn store(&self) -> &TicketStore {
        &self.store
    }

    /// Merged view: local tickets plus both remote partitions, newest first.
    ///
    /// Each partition degrades to empty on failure so one side's outage never
    /// hides the other, or local data. Not deduplicated: a ticket that was
    /// write-through-created appears both as its local record and as the
    /// remote-origin record.
    pub async fn list_merged(&self) -> Vec<Ticket> {
        self.merged(LIST_PER_PAGE).await
    }

    /// Aggregate statistics over the merged view.
    pub async fn dashboard(&self) -> Stats {
        summarize(&self.merged(DASHBOARD_PER_PAGE).await)
    }

    async fn merged(&self, per_page: u32) -> Vec<Ticket> {
        let (opened, closed) = tokio::join!(
            self.fetch_partition(RemoteState::Opened, per_page),
            self.fetch_partition(RemoteState::Closed, per_page),
        );

        let project_ref = self.project_id.as_deref().unwrap_or_default();
        let mut tickets = self.store.list();
        tickets.extend(
            opened
                .into_iter()
                .chain(closed)
                .map(|issue| mapper::remote_to_ticket(&issue, project_ref)),
        );

        // Stable: equal timestamps keep their local-before-remote order.
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tickets
    }

    async fn fetch_partition(&self, state: RemoteState, per_page: u32) -> Vec<RemoteIssue> {
        let query = IssueQuery::partition(state, per_page);
        match self.tracker.list_issues(&query).await {
            Ok((issues, _)) => issues,
            Err(e) => {
                warn!("remote {state} partition fetch failed: {e}");
                Vec::new()
            }
        }
    }

    /// Validate, persist locally, then best-effort mirror to the remote
    /// tracker. Validation failure means nothing was stored; remote failure
    /// is recorded in the sync descriptor and the local create still
    /// succeeds.
    pub async fn create_and_sync(&self, input: NewTicket) -> Result<Ticket> {
        let ticket = self.validate(input)?;
        let stored = self.store.create(ticket);

        let payload = mapper::create_payload(&stored);
        match self.tracker.create_issue(&payload).await {
            Ok(issue) => self.store.update(&stored.id, |t| {
                t.sync.synced = true;
                t.sync.issue_iid = Some(issue.iid);
                t.sync.issue_url = Some(issue.web_url.clone());
                t.sync.last_sync_error = None;
            }),
            Err(e) => {
                warn!("remote create for ticket {} failed: {e}", stored.id);
                self.store.update(&stored.id, |t| {
                    t.sync.synced = false;
                    t.sync.last_sync_error = Some(e.to_string());
                })
            }
        }
    }

    fn validate(&self, input: NewTicket) -> Result<Ticket> {
        if input.service.trim().is_empty() || input.ticket_type.trim().is_empty() {
            return Err(ParkdeskError::Validation(
                "service and type are required".to_string(),
            ));
        }
        let ticket_type: TicketType = input.ticket_type.parse()?;

        if input.title.trim().is_empty() && input.description.trim().is_empty() {
            return Err(ParkdeskError::Validation(
                "title or description is required".to_string(),
            ));
        }

        let priority = match input.priority.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => p.parse::<TicketPriority>()?,
            None => TicketPriority::Medium,
        };

        Ok(Ticket {
            id: String::new(),
            service: input.service.trim().to_string(),
            ticket_type,
            title: truncate_chars(&input.title, MAX_TITLE_LENGTH),
            description: truncate_chars(&input.description, MAX_DESCRIPTION_LENGTH),
            affected_resource: truncate_chars(&input.affected_resource, MAX_FIELD_LENGTH),
            contact: truncate_chars(&input.contact, MAX_FIELD_LENGTH),
            tags: input.tags,
            priority,
            state: TicketState::Open,
            created_at: Utc::now(),
            updated_at: None,
            comments: Vec::new(),
            sync: SyncInfo {
                synced: false,
                project_id: self.project_id.clone(),
                issue_iid: None,
                issue_url: None,
                last_sync_error: None,
            },
        })
    }

    pub fn get(&self, id: &str) -> Result<Ticket> {
        self.store
            .get(id)
            .ok_or_else(|| ParkdeskError::TicketNotFound(id.to_string()))
    }

    /// Set the local state unconditionally, then mirror to the remote issue
    /// if this ticket has one. Mirror failure lands in `last_sync_error`
    /// without affecting the result.
    pub async fn update_state(&self, id: &str, state: TicketState) -> Result<Ticket> {
        let ticket = self.store.update(id, |t| {
            t.state = state;
            t.updated_at = Some(Utc::now());
        })?;

        let iid = match (ticket.sync.synced, ticket.sync.issue_iid) {
            (true, Some(iid)) => iid,
            _ => return Ok(ticket),
        };

        let payload = mapper::update_payload(state);
        match self.tracker.update_issue(iid, &payload).await {
            Ok(_) => self.store.update(id, |t| t.sync.last_sync_error = None),
            Err(e) => {
                warn!("remote mirror of state change for ticket {id} failed: {e}");
                self.store
                    .update(id, |t| t.sync.last_sync_error = Some(e.to_string()))
            }
        }
    }

    /// Apply a partial update. Enum fields are parsed before any mutation so
    /// an invalid value leaves the ticket untouched; a state change goes
    /// through [`Self::update_state`] to get its best-effort remote mirror.
    pub async fn update_ticket(&self, id: &str, patch: TicketPatch) -> Result<Ticket> {
        let state = patch
            .state
            .as_deref()
            .map(str::parse::<TicketState>)
            .transpose()?;
        let priority = patch
            .priority
            .as_deref()
            .map(str::parse::<TicketPriority>)
            .transpose()?;

        let ticket = self.store.update(id, |t| {
            if let Some(priority) = priority {
                t.priority = priority;
            }
            if let Some(title) = &patch.title {
                t.title = truncate_chars(title, MAX_TITLE_LENGTH);
            }
            if let Some(description) = &patch.description {
                t.description = truncate_chars(description, MAX_DESCRIPTION_LENGTH);
            }
            if let Some(affected) = &patch.affected_resource {
                t.affected_resource = truncate_chars(affected, MAX_FIELD_LENGTH);
            }
            if let Some(contact) = &patch.contact {
                t.contact = truncate_chars(contact, MAX_FIELD_LENGTH);
            }
            if let Some(tags) = &patch.tags {
                t.tags = tags.clone();
            }
            t.updated_at = Some(Utc::now());
        })?;

        match state {
            Some(state) => self.update_state(id, state).await,
            None => Ok(ticket),
        }
    }

    /// Append a comment with a server-assigned id and timestamp.
    pub fn add_comment(&self, id: &str, author: Option<String>, text: &str) -> Result<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParkdeskError::Validation(
                "comment text cannot be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let comment = Comment {
            id: now.timestamp_millis().to_string(),
            author: truncate_chars(
                author.as_deref().unwrap_or(DEFAULT_AUTHOR),
                MAX_AUTHOR_LENGTH,
            ),
            text: truncate_chars(text, MAX_COMMENT_LENGTH),
            created_at: now,
        };

        self.store.update(id, |t| {
            t.comments.push(comment.clone());
            t.updated_at = Some(now);
        })?;
        Ok(comment)
    }

    /// Raw remote page pass-through for the tracker browsing endpoint.
    pub async fn remote_page(
        &self,
        labels: Option<String>,
        state: Option<String>,
        page: u32,
    ) -> Result<RemotePage> {
        let query = IssueQuery {
            state: Some(state.unwrap_or_else(|| RemoteState::Opened.to_string())),
            labels,
            page,
            ..IssueQuery::default()
        };
        let (items, info): (Vec<RemoteIssue>, Page) = self.tracker.list_issues(&query).await?;
        Ok(RemotePage {
            items,
            page: info.page,
            next_page: info.next_page,
            total: info.total,
        })
    }

    pub async fn remote_labels(&self) -> Result<Vec<RemoteLabel>> {
        self.tracker.list_labels().await
    }
}
