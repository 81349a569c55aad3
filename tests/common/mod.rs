//! Shared fixtures: an in-memory mock of the remote tracker and ticket
//! builders used by the synchronizer and API tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use parkdesk::{
    CreateIssuePayload, IssueQuery, IssueTracker, NewTicket, Page, ParkdeskError, RemoteIssue,
    RemoteLabel, RemoteState, Result, UpdateIssuePayload,
};

/// Mock remote tracker with per-operation failure switches and call
/// recording.
#[derive(Default)]
pub struct MockTracker {
    pub opened: Vec<RemoteIssue>,
    pub closed: Vec<RemoteIssue>,
    pub labels: Vec<RemoteLabel>,
    pub fail_opened: bool,
    pub fail_closed: bool,
    pub fail_create: bool,
    pub fail_update: bool,
    pub fail_labels: bool,
    pub created: Mutex<Vec<CreateIssuePayload>>,
    pub updated: Mutex<Vec<(u64, UpdateIssuePayload)>>,
}

fn unavailable(what: &str) -> ParkdeskError {
    ParkdeskError::Api {
        status: 503,
        reason: "Service Unavailable".to_string(),
        url: format!("https://gitlab.invalid/{what}"),
        body: "mock outage".to_string(),
    }
}

impl MockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_opened(mut self, issues: Vec<RemoteIssue>) -> Self {
        self.opened = issues;
        self
    }

    pub fn with_closed(mut self, issues: Vec<RemoteIssue>) -> Self {
        self.closed = issues;
        self
    }

    pub fn failing_closed(mut self) -> Self {
        self.fail_closed = true;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn failing_update(mut self) -> Self {
        self.fail_update = true;
        self
    }

    pub fn failing_labels(mut self) -> Self {
        self.fail_labels = true;
        self
    }
}

impl IssueTracker for MockTracker {
    async fn list_issues(&self, query: &IssueQuery) -> Result<(Vec<RemoteIssue>, Page)> {
        let issues = match query.state.as_deref() {
            Some("closed") => {
                if self.fail_closed {
                    return Err(unavailable("issues?state=closed"));
                }
                self.closed.clone()
            }
            _ => {
                if self.fail_opened {
                    return Err(unavailable("issues?state=opened"));
                }
                self.opened.clone()
            }
        };
        let page = Page {
            page: query.page,
            next_page: None,
            total: issues.len() as u64,
        };
        Ok((issues, page))
    }

    async fn create_issue(&self, payload: &CreateIssuePayload) -> Result<RemoteIssue> {
        if self.fail_create {
            return Err(unavailable("issues"));
        }
        let mut created = self.created.lock();
        created.push(payload.clone());
        let iid = 100 + created.len() as u64;
        Ok(RemoteIssue {
            iid,
            title: payload.title.clone(),
            description: Some(payload.description.clone()),
            labels: payload.labels.split(',').map(String::from).collect(),
            state: RemoteState::Opened,
            created_at: Utc::now(),
            web_url: format!("https://gitlab.invalid/citypark/sd/-/issues/{iid}"),
        })
    }

    async fn update_issue(&self, iid: u64, payload: &UpdateIssuePayload) -> Result<RemoteIssue> {
        if self.fail_update {
            return Err(unavailable("issues/update"));
        }
        self.updated.lock().push((iid, payload.clone()));
        Ok(RemoteIssue {
            iid,
            title: "updated".to_string(),
            description: None,
            labels: Vec::new(),
            state: match payload.state_event.as_deref() {
                Some("close") => RemoteState::Closed,
                _ => RemoteState::Opened,
            },
            created_at: Utc::now(),
            web_url: format!("https://gitlab.invalid/citypark/sd/-/issues/{iid}"),
        })
    }

    async fn list_labels(&self) -> Result<Vec<RemoteLabel>> {
        if self.fail_labels {
            return Err(unavailable("labels"));
        }
        Ok(self.labels.clone())
    }
}

pub fn remote_issue(iid: u64, created_at: DateTime<Utc>) -> RemoteIssue {
    RemoteIssue {
        iid,
        title: format!("Remote issue {iid}"),
        description: Some(format!(
            "**Service:** reservas\n**Type:** Incident\n**Affected-Resource:** -\n**Contact:** -\n\nIssue body {iid}"
        )),
        labels: vec!["support".to_string(), "priority::low".to_string()],
        state: RemoteState::Opened,
        created_at,
        web_url: format!("https://gitlab.invalid/citypark/sd/-/issues/{iid}"),
    }
}

pub fn hours_ago(hours: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(hours)
}

pub fn new_ticket(title: &str) -> NewTicket {
    NewTicket {
        service: "reservas".to_string(),
        ticket_type: "Incidente".to_string(),
        title: title.to_string(),
        description: "La app se queda cargando.".to_string(),
        ..NewTicket::default()
    }
}
