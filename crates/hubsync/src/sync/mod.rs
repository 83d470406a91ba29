//! The synchronization and cache-reconciliation engine.
//!
//! # Module Structure
//!
//! - [`types`] - Targets, snapshots, outcomes, and batch options
//! - [`single`] - Per-target sync and the reconciliation algorithm
//! - [`batch`] - Sequential orchestration with failure isolation
//!
//! # Example
//!
//! ```ignore
//! use hubsync::github::GitHubClient;
//! use hubsync::sync::{IssueCache, RepoTarget, SyncEngine};
//!
//! let engine = SyncEngine::new(GitHubClient::new(&token)?);
//! let targets = vec![RepoTarget::new("rust-lang", "rust")];
//! let result = engine.sync_all_repo_issues(&targets, cache).await;
//! tracing::info!("{}/{} targets synced", result.succeeded(), result.total());
//! // The caller persists result.snapshots.
//! ```

mod batch;
mod single;
mod types;

pub use single::{SyncEngine, reconcile_issues};
pub use types::{
    BatchResult, DEFAULT_INTER_TARGET_DELAY, IssueCache, OwnerKind, ProjectCache, ProjectSnapshot,
    ProjectTarget, RepoSnapshot, RepoTarget, SyncOptions, SyncOutcome,
};
