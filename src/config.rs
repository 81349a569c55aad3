//! Remote tracker configuration.
//!
//! Read from the environment once at startup:
//! - `GITLAB_API` - API base URL (defaults to the public gitlab.com v4 API)
//! - `GITLAB_TOKEN` - private token, required for any remote call
//! - `GITLAB_PROJECT_ID` - numeric ID or URL path of the project, required
//!
//! Validation is lazy: building a config (or a client from it) never fails.
//! The first remote-touching call reports the missing variables instead, so
//! local-only operation works without any of them set.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::env;

use crate::error::{ParkdeskError, Result};

pub const DEFAULT_API_BASE: &str = "https://gitlab.com/api/v4";

// Everything encodeURIComponent leaves alone, minus the sub-delims GitLab
// project paths never contain anyway. Notably `/` is escaped to %2F.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, Default)]
pub struct RemoteConfig {
    api_base: String,
    token: Option<String>,
    project_id: Option<String>,
}

impl RemoteConfig {
    pub fn new(
        api_base: impl Into<String>,
        token: Option<String>,
        project_id: Option<String>,
    ) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            api_base,
            token: token.filter(|t| !t.is_empty()),
            project_id: project_id.filter(|p| !p.is_empty()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            env::var("GITLAB_API").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            env::var("GITLAB_TOKEN").ok(),
            env::var("GITLAB_PROJECT_ID").ok(),
        )
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Check the preconditions for talking to the remote tracker.
    ///
    /// Returns the token, or a `Config` error naming every missing variable.
    pub fn require(&self) -> Result<&str> {
        let mut missing = Vec::new();
        if self.token.is_none() {
            missing.push("GITLAB_TOKEN");
        }
        if self.project_id.is_none() {
            missing.push("GITLAB_PROJECT_ID");
        }
        if !missing.is_empty() {
            return Err(ParkdeskError::Config(format!(
                "missing required env vars: {}",
                missing.join(", ")
            )));
        }
        Ok(self.token.as_deref().unwrap_or_default())
    }

    /// Project reference for request paths: numeric IDs pass through,
    /// anything else is percent-encoded as a single path segment.
    pub fn project_ref(&self) -> Result<String> {
        let id = self
            .project_id
            .as_deref()
            .ok_or_else(|| ParkdeskError::Config("GITLAB_PROJECT_ID not set".to_string()))?;
        if id.chars().all(|c| c.is_ascii_digit()) {
            Ok(id.to_string())
        } else {
            Ok(utf8_percent_encode(id, PATH_SEGMENT).to_string())
        }
    }
}
