//! GitHub API client and the transport trait the sync engine runs against.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use super::error::{GitHubError, Result};
use super::types::{Fetched, Identity, RawIssue, RawProject};
use crate::sync::OwnerKind;

/// Base URL of the REST origin.
const API_ROOT: &str = "https://api.github.com";

/// Client agent string sent with every request.
const USER_AGENT: &str = "hubsync";

/// Accept header pinning the REST schema version.
const ACCEPT_V3: &str = "application/vnd.github.v3+json";

/// Accept header for the classic-projects preview endpoints.
const ACCEPT_INERTIA: &str = "application/vnd.github.inertia-preview+json";

/// Maximum page size the origin allows. Only the first page is requested per
/// sync cycle, so a repository with more outstanding updates than one page
/// catches up over multiple cycles. This is a known boundary of the engine,
/// kept deliberately: a pagination loop would change how much rate-limit
/// budget one cycle consumes.
pub const PER_PAGE: u32 = 100;

/// Per-request timeout. A hung request stalls the whole batch, so the
/// transport bounds it here; nothing else wraps an individual fetch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read the remaining-quota counter from GitHub response headers.
pub fn parse_rate_limit_remaining(headers: &HeaderMap) -> Option<u32> {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Transport operations the sync engine needs from the origin.
///
/// [`GitHubClient`] is the production implementation; tests substitute stubs
/// so reconciliation and batch behavior can be exercised without a network.
/// Implementations never retry — retry policy, if any, belongs to callers.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetch one page of a repository's issues, newest-updated first.
    ///
    /// When `since` is present only records updated at or after that instant
    /// are requested (server-side filtering); when absent, all states are
    /// requested. Pull requests are still mixed into the payload and must be
    /// filtered by the mapper.
    async fn issues(
        &self,
        owner: &str,
        repo: &str,
        since: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<Fetched<Vec<RawIssue>>>;

    /// Fetch a repository's classic projects. The endpoint has no
    /// incremental filter, so every call is a full listing.
    async fn repo_projects(&self, owner: &str, repo: &str) -> Result<Fetched<Vec<RawProject>>>;

    /// Fetch an organization's or user's classic projects.
    async fn owner_projects(&self, owner: &str, kind: OwnerKind)
    -> Result<Fetched<Vec<RawProject>>>;

    /// Degenerate fetch against the identity endpoint, confirming the
    /// credential is usable and returning the authenticated login.
    async fn validate_token(&self) -> Result<Fetched<Identity>>;
}

/// Authenticated GitHub REST client.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    token: Arc<String>,
}

impl GitHubClient {
    /// Create a client from a personal access token.
    pub fn new(token: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GitHubError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            token: Arc::new(token.to_string()),
        })
    }

    /// Issue an authenticated GET and decode the JSON payload.
    ///
    /// Surfaces the remaining-rate-limit counter alongside the payload even
    /// on success; non-2xx statuses become [`GitHubError::Status`] without
    /// any retry.
    async fn get<T: DeserializeOwned>(&self, route: &str, accept: &str) -> Result<Fetched<T>> {
        let url = format!("{API_ROOT}{route}");

        let response = self
            .http
            .get(&url)
            .header("Accept", accept)
            .header("User-Agent", USER_AGENT)
            .header("Authorization", format!("Bearer {}", self.token.as_str()))
            .send()
            .await
            .map_err(|e| GitHubError::network(e.to_string()))?;

        let status = response.status();
        let rate_limit_remaining = parse_rate_limit_remaining(response.headers());
        tracing::debug!(%route, status = status.as_u16(), ?rate_limit_remaining, "GitHub response");

        if status == StatusCode::OK {
            let data: T = response
                .json()
                .await
                .map_err(|e| GitHubError::network(format!("JSON parse error: {e}")))?;
            return Ok(Fetched::new(data, rate_limit_remaining));
        }

        let reason = status.canonical_reason().unwrap_or("request failed");
        Err(GitHubError::status(status.as_u16(), reason))
    }
}

#[async_trait]
impl ApiClient for GitHubClient {
    async fn issues(
        &self,
        owner: &str,
        repo: &str,
        since: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<Fetched<Vec<RawIssue>>> {
        let route = issues_route(owner, repo, since);
        self.get(&route, ACCEPT_V3).await
    }

    async fn repo_projects(&self, owner: &str, repo: &str) -> Result<Fetched<Vec<RawProject>>> {
        let route = format!("/repos/{owner}/{repo}/projects");
        self.get(&route, ACCEPT_INERTIA).await
    }

    async fn owner_projects(
        &self,
        owner: &str,
        kind: OwnerKind,
    ) -> Result<Fetched<Vec<RawProject>>> {
        let route = match kind {
            OwnerKind::Org => format!("/orgs/{owner}/projects"),
            OwnerKind::User => format!("/users/{owner}/projects"),
        };
        self.get(&route, ACCEPT_INERTIA).await
    }

    async fn validate_token(&self) -> Result<Fetched<Identity>> {
        self.get("/user", ACCEPT_V3).await
    }
}

/// Build the issue listing route, optionally scoped to a watermark.
fn issues_route(
    owner: &str,
    repo: &str,
    since: Option<chrono::DateTime<chrono::Utc>>,
) -> String {
    let mut route = format!(
        "/repos/{owner}/{repo}/issues?state=all&per_page={PER_PAGE}&sort=updated&direction=desc"
    );
    if let Some(since) = since {
        route.push_str("&since=");
        route.push_str(&since.to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_issues_route_full() {
        let route = issues_route("octo", "repo", None);
        assert_eq!(
            route,
            "/repos/octo/repo/issues?state=all&per_page=100&sort=updated&direction=desc"
        );
    }

    #[test]
    fn test_issues_route_incremental() {
        let since = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let route = issues_route("octo", "repo", Some(since));
        assert!(route.ends_with("&since=2024-03-01T12:30:00Z"));
    }

    #[test]
    fn test_parse_rate_limit_remaining() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", "4321".parse().unwrap());
        assert_eq!(parse_rate_limit_remaining(&headers), Some(4321));

        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", "not-a-number".parse().unwrap());
        assert_eq!(parse_rate_limit_remaining(&headers), None);

        assert_eq!(parse_rate_limit_remaining(&HeaderMap::new()), None);
    }
}
