//! Aggregate statistics over the merged ticket set.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{Ticket, TicketState, VALID_PRIORITIES, VALID_STATES, VALID_TYPES};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub closed: u64,
    /// Open key set: one entry per distinct service observed, no zero-filling.
    pub by_service: BTreeMap<String, u64>,
    pub by_state: BTreeMap<String, u64>,
    pub by_priority: BTreeMap<String, u64>,
    pub by_type: BTreeMap<String, u64>,
}

/// Pure summary of a ticket set. No external calls; usable directly in tests.
pub fn summarize(tickets: &[Ticket]) -> Stats {
    let mut by_service: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_state: BTreeMap<String, u64> = VALID_STATES
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();
    let mut by_priority: BTreeMap<String, u64> = VALID_PRIORITIES
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();
    let mut by_type: BTreeMap<String, u64> = VALID_TYPES
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();

    let mut open = 0;
    let mut in_progress = 0;
    let mut resolved = 0;
    let mut closed = 0;

    for ticket in tickets {
        *by_service.entry(ticket.service.clone()).or_insert(0) += 1;
        *by_state.entry(ticket.state.to_string()).or_insert(0) += 1;
        *by_priority.entry(ticket.priority.to_string()).or_insert(0) += 1;
        *by_type.entry(ticket.ticket_type.to_string()).or_insert(0) += 1;

        match ticket.state {
            TicketState::Open => open += 1,
            TicketState::InProgress => in_progress += 1,
            TicketState::Resolved => resolved += 1,
            TicketState::Closed => closed += 1,
        }
    }

    Stats {
        total: tickets.len() as u64,
        open,
        in_progress,
        resolved,
        closed,
        by_service,
        by_state,
        by_priority,
        by_type,
    }
}
