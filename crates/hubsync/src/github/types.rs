//! Raw GitHub API data types.
//!
//! The origin's JSON is untyped at the boundary. These structs model it
//! exactly as received and go no further than the mapper in
//! [`super::convert`]; nothing downstream of the sync engine sees them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fetched payload together with the rate-limit telemetry that came with
/// the response. The engine propagates the remaining-quota counter to
/// callers on every fetch, including successful ones.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub data: T,
    /// Value of the `X-RateLimit-Remaining` response header, when present.
    pub rate_limit_remaining: Option<u32>,
}

impl<T> Fetched<T> {
    pub fn new(data: T, rate_limit_remaining: Option<u32>) -> Self {
        Self {
            data,
            rate_limit_remaining,
        }
    }

    /// Map the payload while keeping the telemetry.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            rate_limit_remaining: self.rate_limit_remaining,
        }
    }
}

/// An account as it appears inside issue and project payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUser {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLabel {
    pub name: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMilestone {
    pub title: String,
    pub description: Option<String>,
    pub state: String,
}

/// An issue as returned by `GET /repos/{owner}/{repo}/issues`.
///
/// That endpoint conflates pull requests and issues; a record carrying
/// `pull_request` is a PR and must be filtered before mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIssue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub user: RawUser,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    pub assignee: Option<RawUser>,
    pub milestone: Option<RawMilestone>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub html_url: String,
    #[serde(default)]
    pub comments: u32,
    /// PR marker. Presence (any value) means this record is a pull request.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl RawIssue {
    /// True when this record is an actual issue rather than a pull request.
    pub fn is_real_issue(&self) -> bool {
        self.pull_request.is_none()
    }
}

/// A classic project as returned by the projects endpoints.
///
/// The wire field for the title is `name`; the canonical shape calls it
/// `title`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProject {
    pub id: u64,
    pub number: u64,
    pub name: String,
    pub body: Option<String>,
    pub state: String,
    pub creator: RawUser,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub html_url: String,
}

/// The authenticated account, from `GET /user`.
///
/// Used to confirm a credential works and to give consumers the login for
/// "assigned to me" style comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub login: String,
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_request_marker() {
        let issue: RawIssue = serde_json::from_value(serde_json::json!({
            "id": 1, "number": 10, "title": "a bug", "body": null,
            "state": "open",
            "user": {"login": "alice", "avatar_url": "https://a.test/alice"},
            "labels": [], "assignee": null, "milestone": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z",
            "html_url": "https://github.test/o/r/issues/10",
            "comments": 0
        }))
        .unwrap();
        assert!(issue.is_real_issue());

        let pr: RawIssue = serde_json::from_value(serde_json::json!({
            "id": 2, "number": 11, "title": "a change", "body": "diff",
            "state": "open",
            "user": {"login": "bob", "avatar_url": ""},
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z",
            "html_url": "https://github.test/o/r/pull/11",
            "pull_request": {"url": "https://api.github.test/pulls/11"}
        }))
        .unwrap();
        assert!(!pr.is_real_issue());
    }

    #[test]
    fn test_fetched_map_keeps_telemetry() {
        let fetched = Fetched::new(vec![1, 2, 3], Some(4999));
        let mapped = fetched.map(|v| v.len());
        assert_eq!(mapped.data, 3);
        assert_eq!(mapped.rate_limit_remaining, Some(4999));
    }
}
