//! Field mapping between the local ticket schema and the remote issue schema.
//!
//! Everything here is pure. Structured metadata (service, type,
//! affected-resource, contact) is carried through the remote issue's
//! free-text description as literal `**Field:** value` lines and parsed back
//! out on read; priority rides on a `priority::low|medium|high` scoped label.

use regex::Regex;
use std::sync::LazyLock;

use crate::remote::{CreateIssuePayload, RemoteIssue, RemoteState, UpdateIssuePayload};
use crate::types::{SyncInfo, Ticket, TicketPriority, TicketState, TicketType};

/// Metadata fields embedded in remote issue descriptions, in write order.
pub const META_FIELDS: [&str; 4] = ["Service", "Type", "Affected-Resource", "Contact"];

const DEFAULT_SERVICE: &str = "reservas";
const UNTITLED: &str = "(untitled)";

static META_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\*\*(Service|Type|Affected-Resource|Contact):\*\*").expect("static regex")
});

static PRIORITY_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^priority::").expect("static regex"));

/// Derive priority from a label set. High wins over Low wins over Medium;
/// Medium when no priority label is present.
pub fn priority_from_labels(labels: &[String]) -> TicketPriority {
    let mut has_low = false;
    for label in labels {
        match label.to_lowercase().as_str() {
            "priority::high" => return TicketPriority::High,
            "priority::low" => has_low = true,
            _ => {}
        }
    }
    if has_low {
        TicketPriority::Low
    } else {
        TicketPriority::Medium
    }
}

/// Inverse of [`priority_from_labels`].
pub fn priority_label(priority: TicketPriority) -> &'static str {
    match priority {
        TicketPriority::Low => "priority::low",
        TicketPriority::Medium => "priority::medium",
        TicketPriority::High => "priority::high",
    }
}

/// Extract the value of a `**field:** value` line, case-insensitively.
pub fn extract_meta_field(text: &str, field: &str) -> Option<String> {
    let pattern = format!(r"(?mi)^\*\*{}:\*\*[ \t]*(.*)$", regex::escape(field));
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Remove every known metadata line and trim the remainder. Idempotent.
pub fn strip_meta_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !META_LINE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn meta_or_empty(text: &str, field: &str) -> String {
    // "-" is the placeholder written for empty fields on the way out.
    extract_meta_field(text, field)
        .filter(|v| v != "-")
        .unwrap_or_default()
}

/// Synthesize a local ticket from a fetched remote issue.
///
/// The id is prefixed (`g-{iid}`) to keep remote-origin records distinct from
/// locally-created ones in the merged view, and the sync descriptor is fully
/// populated with `synced=true`.
pub fn remote_to_ticket(issue: &RemoteIssue, project_ref: &str) -> Ticket {
    let text = issue.description.as_deref().unwrap_or_default();

    let service = extract_meta_field(text, "Service")
        .map(|s| s.to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SERVICE.to_string());
    let ticket_type = extract_meta_field(text, "Type")
        .and_then(|t| t.parse::<TicketType>().ok())
        .unwrap_or_default();

    let tags = issue
        .labels
        .iter()
        .filter(|label| !PRIORITY_LABEL.is_match(label))
        .cloned()
        .collect();

    let title = if issue.title.is_empty() {
        UNTITLED.to_string()
    } else {
        issue.title.clone()
    };

    Ticket {
        id: format!("g-{}", issue.iid),
        service,
        ticket_type,
        title,
        description: strip_meta_lines(text),
        affected_resource: meta_or_empty(text, "Affected-Resource"),
        contact: meta_or_empty(text, "Contact"),
        tags,
        priority: priority_from_labels(&issue.labels),
        state: match issue.state {
            RemoteState::Closed => TicketState::Closed,
            RemoteState::Opened => TicketState::Open,
        },
        created_at: issue.created_at,
        updated_at: None,
        comments: Vec::new(),
        sync: SyncInfo {
            synced: true,
            project_id: Some(project_ref.to_string()),
            issue_iid: Some(issue.iid),
            issue_url: Some(issue.web_url.clone()),
            last_sync_error: None,
        },
    }
}

fn dash_if_empty(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

/// Build the remote creation payload for a local ticket: metadata block,
/// blank line, then the free-text description; labels are the deduplicated
/// union of the ticket's tags and its priority label.
pub fn create_payload(ticket: &Ticket) -> CreateIssuePayload {
    let description = format!(
        "**Service:** {}\n**Type:** {}\n**Affected-Resource:** {}\n**Contact:** {}\n\n{}",
        ticket.service,
        ticket.ticket_type,
        dash_if_empty(&ticket.affected_resource),
        dash_if_empty(&ticket.contact),
        ticket.description,
    );

    let mut labels: Vec<String> = Vec::new();
    for tag in &ticket.tags {
        if !labels.contains(tag) {
            labels.push(tag.clone());
        }
    }
    let plabel = priority_label(ticket.priority).to_string();
    if !labels.contains(&plabel) {
        labels.push(plabel);
    }

    CreateIssuePayload {
        title: if ticket.title.is_empty() {
            UNTITLED.to_string()
        } else {
            ticket.title.clone()
        },
        description,
        labels: labels.join(","),
        confidential: false,
    }
}

/// Build the remote mirror payload for a local state change.
///
/// Closed and Open map to native `close`/`reopen` actions; In-Progress and
/// Resolved have no native remote state and carry only the advisory
/// `status::*` label. The previous status label is not removed, so labels can
/// drift on the remote side; the annotation is not authoritative.
pub fn update_payload(state: TicketState) -> UpdateIssuePayload {
    let state_event = match state {
        TicketState::Closed => Some("close".to_string()),
        TicketState::Open => Some("reopen".to_string()),
        TicketState::InProgress | TicketState::Resolved => None,
    };

    let status_label = match state {
        TicketState::Open => "status::new",
        TicketState::InProgress => "status::in_progress",
        TicketState::Resolved => "status::done",
        TicketState::Closed => "status::closed",
    };

    UpdateIssuePayload {
        state_event,
        labels: Some(status_label.to_string()),
    }
}
