//! Sync targets, snapshots, outcomes, and options.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Issue, Project};

/// Default pause between consecutive targets in a batch. Keeps the engine
/// under the origin's abuse rate limiting even when the primary quota still
/// has headroom.
pub const DEFAULT_INTER_TARGET_DELAY: Duration = Duration::from_millis(100);

/// Whether an externally configured project hangs off an org or a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Org,
    User,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Org => "org",
            Self::User => "user",
        }
    }
}

/// One repository whose issues and projects are mirrored.
///
/// The same target (and the same snapshot key) serves both the issue batch
/// and the repo-projects batch; the two sub-fields of [`RepoSnapshot`] are
/// replaced independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoTarget {
    pub owner: String,
    pub repo: String,
    /// Disabled targets are skipped entirely: no fetch, no outcome entry.
    #[serde(default)]
    pub disabled: bool,
}

impl RepoTarget {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            disabled: false,
        }
    }

    /// Snapshot-store key. Two path segments, so it can never collide with
    /// the three-segment [`ProjectTarget::key`].
    pub fn key(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// One externally configured org- or user-level project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTarget {
    pub owner: String,
    pub number: u64,
    pub kind: OwnerKind,
    #[serde(default)]
    pub disabled: bool,
}

impl ProjectTarget {
    pub fn new(owner: impl Into<String>, number: u64, kind: OwnerKind) -> Self {
        Self {
            owner: owner.into(),
            number,
            kind,
            disabled: false,
        }
    }

    /// Snapshot-store key, e.g. `org/rust-lang/12`.
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.kind.as_str(), self.owner, self.number)
    }
}

/// Persisted last-known state for one repository.
///
/// `last_sync` is the incremental watermark for the issue listing; the
/// classic-projects endpoint has no incremental filter, so the projects
/// sub-field is always replaced wholesale and never moves the watermark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoSnapshot {
    pub last_sync: Option<DateTime<Utc>>,
    /// Issues keyed by provider-assigned id, the merge key.
    pub issues: BTreeMap<u64, Issue>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Persisted last-known state for one external project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub last_sync: DateTime<Utc>,
    pub project: Project,
}

/// Caller-owned store mapping repository keys to snapshots.
///
/// The engine only ever reads and overwrites entries; durability is the
/// caller's concern.
pub type IssueCache = BTreeMap<String, RepoSnapshot>;

/// Caller-owned store mapping external-project keys to snapshots.
pub type ProjectCache = BTreeMap<String, ProjectSnapshot>;

/// Per-target result of one sync. Transient, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub record_count: Option<usize>,
    pub rate_limit_remaining: Option<u32>,
}

impl SyncOutcome {
    pub fn ok(record_count: usize, rate_limit_remaining: Option<u32>) -> Self {
        Self {
            success: true,
            error: None,
            record_count: Some(record_count),
            rate_limit_remaining,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            record_count: None,
            rate_limit_remaining: None,
        }
    }

    pub fn failed_with_rate_limit(
        error: impl Into<String>,
        rate_limit_remaining: Option<u32>,
    ) -> Self {
        Self {
            rate_limit_remaining,
            ..Self::failed(error)
        }
    }
}

/// Aggregate result of one batch: updated snapshots plus per-target
/// outcomes, both keyed by the target's store key.
#[derive(Debug, Clone, Default)]
pub struct BatchResult<S> {
    pub snapshots: BTreeMap<String, S>,
    pub outcomes: BTreeMap<String, SyncOutcome>,
}

impl<S> BatchResult<S> {
    /// Number of targets that synced cleanly.
    pub fn succeeded(&self) -> usize {
        self.outcomes.values().filter(|o| o.success).count()
    }

    /// Number of targets that failed this cycle.
    pub fn failed(&self) -> usize {
        self.outcomes.values().filter(|o| !o.success).count()
    }

    /// Number of targets processed (disabled targets are absent).
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// Options for batch orchestration.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Pause between consecutive processed targets.
    pub inter_target_delay: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            inter_target_delay: DEFAULT_INTER_TARGET_DELAY,
        }
    }
}
