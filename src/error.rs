use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParkdeskError {
    #[error("ticket '{0}' not found")]
    TicketNotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid state '{0}'")]
    InvalidState(String),

    #[error("invalid ticket type '{0}'")]
    InvalidType(String),

    #[error("invalid priority '{0}'")]
    InvalidPriority(String),

    #[error("configuration error: {0}")]
    Config(String),

    // Remote tracker errors
    #[error("GitLab {status} {reason} for {url}\n{body}")]
    Api {
        status: u16,
        reason: String,
        url: String,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParkdeskError {
    /// True for failures of the remote tracker or its preconditions.
    ///
    /// These are the errors that write-through paths capture into the
    /// ticket's sync descriptor instead of returning to the caller.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ParkdeskError::Config(_) | ParkdeskError::Api { .. } | ParkdeskError::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ParkdeskError>;
