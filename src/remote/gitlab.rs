//! GitLab REST client.
//!
//! A thin wrapper over `reqwest` for the handful of endpoints the tracker
//! needs. Every request carries the `PRIVATE-TOKEN` header; any non-2xx
//! response becomes a structured [`ParkdeskError::Api`] carrying the status,
//! reason phrase, and response body. Missing configuration fails before any
//! network call.

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::RemoteConfig;
use crate::error::{ParkdeskError, Result};

use super::{
    CreateIssuePayload, IssueQuery, IssueTracker, Page, RemoteIssue, RemoteLabel,
    UpdateIssuePayload,
};

pub struct GitLabClient {
    http: Client,
    config: RemoteConfig,
}

impl GitLabClient {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}{}", self.config.api_base(), path);
        Url::parse(&raw)
            .map_err(|e| ParkdeskError::Config(format!("invalid GitLab API URL '{raw}': {e}")))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&impl Serialize>,
    ) -> Result<(T, HeaderMap)> {
        let token = self.config.require()?;

        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        let mut request = self
            .http
            .request(method, url.clone())
            .header("PRIVATE-TOKEN", token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &url, body));
        }

        let headers = response.headers().clone();
        let data = response.json::<T>().await?;
        Ok((data, headers))
    }
}

fn api_error(status: StatusCode, url: &Url, body: String) -> ParkdeskError {
    ParkdeskError::Api {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        url: url.to_string(),
        body,
    }
}

fn header_num<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

/// Pagination is communicated via response headers, not a body envelope.
fn page_from_headers(headers: &HeaderMap) -> Page {
    Page {
        page: header_num(headers, "x-page").unwrap_or(1),
        next_page: header_num(headers, "x-next-page"),
        total: header_num(headers, "x-total").unwrap_or(0),
    }
}

impl IssueTracker for GitLabClient {
    async fn list_issues(&self, query: &IssueQuery) -> Result<(Vec<RemoteIssue>, Page)> {
        self.config.require()?;
        let path = format!("/projects/{}/issues", self.config.project_ref()?);

        let mut params: Vec<(&str, String)> = vec![
            ("per_page", query.per_page.to_string()),
            ("page", query.page.to_string()),
        ];
        if let Some(state) = &query.state {
            params.push(("state", state.clone()));
        }
        if let Some(labels) = &query.labels {
            params.push(("labels", labels.clone()));
        }
        if let Some(order_by) = &query.order_by {
            params.push(("order_by", order_by.clone()));
        }
        if let Some(sort) = &query.sort {
            params.push(("sort", sort.clone()));
        }

        let (issues, headers) = self
            .send::<Vec<RemoteIssue>>(Method::GET, &path, &params, None::<&()>)
            .await?;
        let page = page_from_headers(&headers);
        Ok((issues, page))
    }

    async fn create_issue(&self, payload: &CreateIssuePayload) -> Result<RemoteIssue> {
        self.config.require()?;
        let path = format!("/projects/{}/issues", self.config.project_ref()?);
        let (issue, _) = self
            .send::<RemoteIssue>(Method::POST, &path, &[], Some(payload))
            .await?;
        Ok(issue)
    }

    async fn update_issue(&self, iid: u64, payload: &UpdateIssuePayload) -> Result<RemoteIssue> {
        self.config.require()?;
        let path = format!("/projects/{}/issues/{}", self.config.project_ref()?, iid);
        let (issue, _) = self
            .send::<RemoteIssue>(Method::PUT, &path, &[], Some(payload))
            .await?;
        Ok(issue)
    }

    async fn list_labels(&self) -> Result<Vec<RemoteLabel>> {
        self.config.require()?;
        let path = format!("/projects/{}/labels", self.config.project_ref()?);
        let params = [
            ("per_page", "100".to_string()),
            ("with_counts", "true".to_string()),
        ];
        let (labels, _) = self
            .send::<Vec<RemoteLabel>>(Method::GET, &path, &params, None::<&()>)
            .await?;
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(
                reqwest::header::HeaderName::from_bytes(k.as_bytes()).unwrap(),
                HeaderValue::from_str(v).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_page_from_headers() {
        let h = headers(&[("x-page", "2"), ("x-next-page", "3"), ("x-total", "57")]);
        assert_eq!(
            page_from_headers(&h),
            Page {
                page: 2,
                next_page: Some(3),
                total: 57
            }
        );
    }

    #[test]
    fn test_page_from_headers_defaults() {
        let h = headers(&[("x-next-page", "")]);
        assert_eq!(
            page_from_headers(&h),
            Page {
                page: 1,
                next_page: None,
                total: 0
            }
        );
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_before_network() {
        let client = GitLabClient::new(RemoteConfig::new("https://gitlab.invalid", None, None));
        let err = client
            .list_issues(&IssueQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ParkdeskError::Config(_)), "got: {err:?}");
    }

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let client = GitLabClient::new(RemoteConfig::new(
            "https://gitlab.example.com/api/v4",
            Some("t".to_string()),
            Some("42".to_string()),
        ));
        let url = client.endpoint("/projects/42/issues").unwrap();
        assert_eq!(
            url.as_str(),
            "https://gitlab.example.com/api/v4/projects/42/issues"
        );
    }
}
