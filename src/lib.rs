pub mod config;
pub mod error;
pub mod mapper;
pub mod remote;
pub mod routes;
pub mod server;
pub mod stats;
pub mod store;
pub mod sync;
pub mod types;

pub use config::RemoteConfig;
pub use error::{ParkdeskError, Result};
pub use remote::{
    CreateIssuePayload, GitLabClient, IssueQuery, IssueTracker, Page, RemoteIssue, RemoteLabel,
    RemoteState, UpdateIssuePayload,
};
pub use stats::{summarize, Stats};
pub use store::TicketStore;
pub use sync::{NewTicket, Synchronizer, TicketPatch};
pub use types::{
    Comment, SyncInfo, Ticket, TicketPriority, TicketState, TicketType, VALID_PRIORITIES,
    VALID_STATES, VALID_TYPES,
};
