//! Canonical record shapes stored in snapshots.
//!
//! These are the crate's own entity types, produced exactly once from the
//! raw wire structs in [`crate::github::types`] by the mapper in
//! [`crate::github::convert`]. Everything here is serde-serializable so
//! callers can persist snapshot maps with whatever medium they own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Open/closed state shared by issues, projects, and milestones.
///
/// This is a closed two-value enum. The mapper refuses to default when the
/// origin returns anything outside it; see
/// [`crate::github::error::GitHubError::MalformedRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordState {
    Open,
    Closed,
}

impl RecordState {
    /// Parse a wire-format state value. Returns `None` for anything outside
    /// the closed set so the caller can surface a malformed-record error.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// A GitHub account reference (issue author, assignee, project creator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub login: String,
    pub avatar_url: String,
}

/// An issue label. Order within an issue's label list is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
}

/// Milestone attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
    pub description: Option<String>,
    pub state: RecordState,
}

/// The repository an issue belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

/// A canonical issue record.
///
/// `id` is the provider-assigned immutable identifier and the merge key
/// within a repository's snapshot. `number` is stable per repository but not
/// globally unique, so it is never used for merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    /// Issue body. Absent on the wire maps to the empty string, never null.
    pub body: String,
    pub state: RecordState,
    pub author: Author,
    pub labels: Vec<Label>,
    pub assignee: Option<Author>,
    pub milestone: Option<Milestone>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub html_url: String,
    pub comments: u32,
    pub repository: RepoRef,
}

/// A canonical classic-project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: RecordState,
    pub creator: Author,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub html_url: String,
}
