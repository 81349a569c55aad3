use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParkdeskError;

pub const MAX_TITLE_LENGTH: usize = 120;
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;
pub const MAX_FIELD_LENGTH: usize = 120;
pub const MAX_AUTHOR_LENGTH: usize = 100;
pub const MAX_COMMENT_LENGTH: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketState {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketState::Open => write!(f, "Open"),
            TicketState::InProgress => write!(f, "In Progress"),
            TicketState::Resolved => write!(f, "Resolved"),
            TicketState::Closed => write!(f, "Closed"),
        }
    }
}

impl FromStr for TicketState {
    type Err = ParkdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(TicketState::Open),
            "in progress" | "in-progress" | "in_progress" => Ok(TicketState::InProgress),
            "resolved" => Ok(TicketState::Resolved),
            "closed" => Ok(TicketState::Closed),
            _ => Err(ParkdeskError::InvalidState(s.to_string())),
        }
    }
}

pub const VALID_STATES: &[&str] = &["Open", "In Progress", "Resolved", "Closed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketType {
    #[default]
    Incident,
    Request,
    Problem,
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketType::Incident => write!(f, "Incident"),
            TicketType::Request => write!(f, "Request"),
            TicketType::Problem => write!(f, "Problem"),
        }
    }
}

impl FromStr for TicketType {
    type Err = ParkdeskError;

    // Accepts the legacy Spanish forms still sent by older clients.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "incident" | "incidente" => Ok(TicketType::Incident),
            "request" | "solicitud" => Ok(TicketType::Request),
            "problem" | "problema" => Ok(TicketType::Problem),
            _ => Err(ParkdeskError::InvalidType(s.to_string())),
        }
    }
}

pub const VALID_TYPES: &[&str] = &["Incident", "Request", "Problem"];

/// Canonical priority scale.
///
/// The legacy four-tier P1-P4 scale is accepted on parse and converted
/// immediately (P1/P2 -> High, P3 -> Medium, P4 -> Low); no four-tier
/// value survives past this boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketPriority::Low => write!(f, "Low"),
            TicketPriority::Medium => write!(f, "Medium"),
            TicketPriority::High => write!(f, "High"),
        }
    }
}

impl FromStr for TicketPriority {
    type Err = ParkdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" | "p4" => Ok(TicketPriority::Low),
            "medium" | "p3" => Ok(TicketPriority::Medium),
            "high" | "p1" | "p2" => Ok(TicketPriority::High),
            _ => Err(ParkdeskError::InvalidPriority(s.to_string())),
        }
    }
}

pub const VALID_PRIORITIES: &[&str] = &["Low", "Medium", "High"];

/// Per-ticket record of whether and how it is mirrored to the remote tracker.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncInfo {
    pub synced: bool,
    pub project_id: Option<String>,
    pub issue_iid: Option<u64>,
    pub issue_url: Option<String>,
    pub last_sync_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Local canonical unit of work, either created directly or derived from a
/// remote issue on each fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub service: String,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub affected_resource: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub priority: TicketPriority,
    pub state: TicketState,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub sync: SyncInfo,
}

/// Truncate to a maximum number of characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_roundtrip() {
        for s in VALID_STATES {
            let state: TicketState = s.parse().unwrap();
            assert_eq!(&state.to_string(), s);
        }
    }

    #[test]
    fn test_state_parse_variants() {
        assert_eq!(
            "in_progress".parse::<TicketState>().unwrap(),
            TicketState::InProgress
        );
        assert_eq!(
            "CLOSED".parse::<TicketState>().unwrap(),
            TicketState::Closed
        );
        assert!("Done".parse::<TicketState>().is_err());
    }

    #[test]
    fn test_type_accepts_legacy_spanish() {
        assert_eq!(
            "Incidente".parse::<TicketType>().unwrap(),
            TicketType::Incident
        );
        assert_eq!(
            "Solicitud".parse::<TicketType>().unwrap(),
            TicketType::Request
        );
        assert_eq!(
            "Problema".parse::<TicketType>().unwrap(),
            TicketType::Problem
        );
        assert!("Bug".parse::<TicketType>().is_err());
    }

    #[test]
    fn test_priority_legacy_scale_conversion() {
        assert_eq!("P1".parse::<TicketPriority>().unwrap(), TicketPriority::High);
        assert_eq!("P2".parse::<TicketPriority>().unwrap(), TicketPriority::High);
        assert_eq!(
            "P3".parse::<TicketPriority>().unwrap(),
            TicketPriority::Medium
        );
        assert_eq!("p4".parse::<TicketPriority>().unwrap(), TicketPriority::Low);
        assert!("P5".parse::<TicketPriority>().is_err());
    }

    #[test]
    fn test_in_progress_serde_rename() {
        let json = serde_json::to_string(&TicketState::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: TicketState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TicketState::InProgress);
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("áéíóú", 3), "áéí");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
