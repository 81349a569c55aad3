//! In-memory ticket store.
//!
//! An explicitly constructed, injected collection with sequence-assigned ids.
//! Ephemeral by design: contents live only as long as the process. Not a
//! concurrency-control layer; the mutex keeps individual operations
//! consistent, nothing more.

use parking_lot::Mutex;

use crate::error::{ParkdeskError, Result};
use crate::types::Ticket;

#[derive(Default)]
struct Inner {
    seq: u64,
    items: Vec<Ticket>,
}

#[derive(Default)]
pub struct TicketStore {
    inner: Mutex<Inner>,
}

impl TicketStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                seq: 1,
                items: Vec::new(),
            }),
        }
    }

    /// Insert a ticket, assigning the next sequence id. Returns the stored
    /// record.
    pub fn create(&self, mut ticket: Ticket) -> Ticket {
        let mut inner = self.inner.lock();
        ticket.id = inner.seq.to_string();
        inner.seq += 1;
        inner.items.push(ticket.clone());
        ticket
    }

    pub fn get(&self, id: &str) -> Option<Ticket> {
        self.inner.lock().items.iter().find(|t| t.id == id).cloned()
    }

    /// Snapshot of all tickets in insertion order.
    pub fn list(&self) -> Vec<Ticket> {
        self.inner.lock().items.clone()
    }

    /// Apply a mutation to the stored ticket and return the updated record.
    pub fn update<F>(&self, id: &str, mutate: F) -> Result<Ticket>
    where
        F: FnOnce(&mut Ticket),
    {
        let mut inner = self.inner.lock();
        let ticket = inner
            .items
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ParkdeskError::TicketNotFound(id.to_string()))?;
        mutate(ticket);
        Ok(ticket.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SyncInfo, TicketPriority, TicketState, TicketType};
    use chrono::Utc;

    fn ticket(title: &str) -> Ticket {
        Ticket {
            id: String::new(),
            service: "reservas".to_string(),
            ticket_type: TicketType::Incident,
            title: title.to_string(),
            description: String::new(),
            affected_resource: String::new(),
            contact: String::new(),
            tags: Vec::new(),
            priority: TicketPriority::Medium,
            state: TicketState::Open,
            created_at: Utc::now(),
            updated_at: None,
            comments: Vec::new(),
            sync: SyncInfo::default(),
        }
    }

    #[test]
    fn test_sequence_ids() {
        let store = TicketStore::new();
        assert_eq!(store.create(ticket("a")).id, "1");
        assert_eq!(store.create(ticket("b")).id, "2");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_get_and_list() {
        let store = TicketStore::new();
        store.create(ticket("a"));
        let b = store.create(ticket("b"));
        assert_eq!(store.get(&b.id).unwrap().title, "b");
        assert!(store.get("99").is_none());
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_update_mutates_stored_record() {
        let store = TicketStore::new();
        let t = store.create(ticket("a"));
        let updated = store
            .update(&t.id, |t| t.state = TicketState::Closed)
            .unwrap();
        assert_eq!(updated.state, TicketState::Closed);
        assert_eq!(store.get(&t.id).unwrap().state, TicketState::Closed);
    }

    #[test]
    fn test_update_unknown_id() {
        let store = TicketStore::new();
        let err = store.update("nope", |_| {}).unwrap_err();
        assert!(matches!(err, ParkdeskError::TicketNotFound(_)));
    }
}
