//! Remote issue tracker integration.
//!
//! Normalized wire types for the GitLab issues API plus the narrow
//! `IssueTracker` seam the synchronizer talks through. The concrete REST
//! client lives in [`gitlab`].

pub mod gitlab;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

pub use gitlab::GitLabClient;

/// Issue state as the remote tracker represents it. The remote side has no
/// notion of In-Progress or Resolved; those exist only locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteState {
    Opened,
    Closed,
}

impl fmt::Display for RemoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteState::Opened => write!(f, "opened"),
            RemoteState::Closed => write!(f, "closed"),
        }
    }
}

/// Normalized remote issue record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteIssue {
    /// Project-scoped sequence number.
    pub iid: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub state: RemoteState,
    pub created_at: DateTime<Utc>,
    pub web_url: String,
}

/// Project label as returned by the labels endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLabel {
    pub id: u64,
    pub name: String,
    #[serde(default = "default_label_color")]
    pub color: String,
    #[serde(default)]
    pub description: String,
}

fn default_label_color() -> String {
    "#1f6feb".to_string()
}

/// Query parameters for the issue list endpoint.
#[derive(Debug, Clone)]
pub struct IssueQuery {
    pub state: Option<String>,
    /// Comma-joined label filter.
    pub labels: Option<String>,
    pub page: u32,
    pub per_page: u32,
    pub order_by: Option<String>,
    pub sort: Option<String>,
}

impl Default for IssueQuery {
    fn default() -> Self {
        Self {
            state: None,
            labels: None,
            page: 1,
            per_page: 20,
            order_by: None,
            sort: None,
        }
    }
}

impl IssueQuery {
    /// Partition query used by the merged read path: one state, newest first.
    pub fn partition(state: RemoteState, per_page: u32) -> Self {
        Self {
            state: Some(state.to_string()),
            per_page,
            order_by: Some("created_at".to_string()),
            sort: Some("desc".to_string()),
            ..Self::default()
        }
    }
}

/// Pagination info carried in list response headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub page: u32,
    pub next_page: Option<u32>,
    pub total: u64,
}

/// Payload for creating a remote issue.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateIssuePayload {
    pub title: String,
    pub description: String,
    /// Comma-joined label names.
    pub labels: String,
    pub confidential: bool,
}

/// Payload for updating a remote issue.
///
/// `state_event` drives the native open/closed transition; `labels` carries
/// the advisory `status::*` annotation for states the remote cannot express.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UpdateIssuePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
}

/// Narrow interface to the remote tracker.
///
/// No retry or resilience at this level; callers decide whether a failure is
/// tolerable (read partitions degrade to empty, write-through records the
/// error in the sync descriptor).
pub trait IssueTracker: Send + Sync {
    fn list_issues(
        &self,
        query: &IssueQuery,
    ) -> impl std::future::Future<Output = Result<(Vec<RemoteIssue>, Page)>> + Send;

    fn create_issue(
        &self,
        payload: &CreateIssuePayload,
    ) -> impl std::future::Future<Output = Result<RemoteIssue>> + Send;

    fn update_issue(
        &self,
        iid: u64,
        payload: &UpdateIssuePayload,
    ) -> impl std::future::Future<Output = Result<RemoteIssue>> + Send;

    fn list_labels(&self) -> impl std::future::Future<Output = Result<Vec<RemoteLabel>>> + Send;
}

impl<T: IssueTracker> IssueTracker for std::sync::Arc<T> {
    async fn list_issues(&self, query: &IssueQuery) -> Result<(Vec<RemoteIssue>, Page)> {
        (**self).list_issues(query).await
    }

    async fn create_issue(&self, payload: &CreateIssuePayload) -> Result<RemoteIssue> {
        (**self).create_issue(payload).await
    }

    async fn update_issue(&self, iid: u64, payload: &UpdateIssuePayload) -> Result<RemoteIssue> {
        (**self).update_issue(iid, payload).await
    }

    async fn list_labels(&self) -> Result<Vec<RemoteLabel>> {
        (**self).list_labels().await
    }
}
