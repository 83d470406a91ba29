//! Hubsync - mirror GitHub issue and project metadata into a local cache.
//!
//! This library fetches issues and classic projects for many repositories
//! and externally configured projects, reconciles them into caller-owned
//! snapshot maps, and sequences the work so a shared rate-limit budget is
//! never hammered. Snapshots are plain serde values; where they live is the
//! caller's business, and nothing here writes back to the origin.
//!
//! # Example
//!
//! ```ignore
//! use hubsync::github::GitHubClient;
//! use hubsync::sync::{IssueCache, RepoTarget, SyncEngine};
//!
//! let engine = SyncEngine::new(GitHubClient::new(&token)?);
//!
//! let targets = vec![
//!     RepoTarget::new("rust-lang", "rust"),
//!     RepoTarget::new("tokio-rs", "tokio"),
//! ];
//!
//! // First run is a full sync; later runs are incremental via the stored
//! // watermark in each snapshot.
//! let result = engine.sync_all_repo_issues(&targets, IssueCache::new()).await;
//! persist(&result.snapshots)?;
//! println!("{}/{} repositories synced", result.succeeded(), result.total());
//! ```

pub mod entity;
pub mod github;
pub mod sync;

pub use entity::{Author, Issue, Label, Milestone, Project, RecordState, RepoRef};
pub use github::{ApiClient, GitHubClient, GitHubError};
pub use sync::{
    BatchResult, IssueCache, OwnerKind, ProjectCache, ProjectSnapshot, ProjectTarget,
    RepoSnapshot, RepoTarget, SyncEngine, SyncOptions, SyncOutcome,
};
