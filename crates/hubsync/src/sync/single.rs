//! Single-target sync: the since-or-full decision, fetch, map, and
//! reconciliation against the stored snapshot.
//!
//! None of these operations mutate shared state; each returns a fresh
//! snapshot value (or `None` on failure) and the caller decides what to
//! commit. Failures are reported through [`SyncOutcome`], never as `Err`.

use std::collections::BTreeMap;

use chrono::Utc;

use super::types::{
    ProjectSnapshot, ProjectTarget, RepoSnapshot, RepoTarget, SyncOptions, SyncOutcome,
};
use crate::entity::Issue;
use crate::github::client::ApiClient;
use crate::github::convert::{map_issues, map_project, map_projects};

/// The sync engine: one transport client plus batch options.
///
/// The client and the snapshot stores are passed in explicitly (no ambient
/// state), which is what keeps the reconciliation behavior testable with
/// stub clients.
#[derive(Clone)]
pub struct SyncEngine<C> {
    client: C,
    options: SyncOptions,
}

impl<C> SyncEngine<C> {
    pub fn new(client: C) -> Self {
        Self::with_options(client, SyncOptions::default())
    }

    pub fn with_options(client: C, options: SyncOptions) -> Self {
        Self { client, options }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }
}

/// Combine a stored issue set with freshly fetched records.
///
/// Incremental mode is a right-biased union keyed by issue id: fetched data
/// wins for ids present on both sides, and records absent from the fetch are
/// retained, because the incremental endpoint returns only changed records
/// and absence does not imply deletion. Full mode discards the stored set;
/// the full fetch is authoritative for its page window.
pub fn reconcile_issues(
    existing: Option<&RepoSnapshot>,
    fetched: Vec<Issue>,
    incremental: bool,
) -> BTreeMap<u64, Issue> {
    let mut records = match (incremental, existing) {
        (true, Some(snapshot)) => snapshot.issues.clone(),
        _ => BTreeMap::new(),
    };
    for issue in fetched {
        records.insert(issue.id, issue);
    }
    records
}

impl<C: ApiClient> SyncEngine<C> {
    /// Sync one repository's issues.
    ///
    /// A stored watermark makes this incremental; otherwise it is a full
    /// sync. On success `last_sync` advances to now unconditionally, even
    /// for an empty delta, and the snapshot's projects sub-field is carried
    /// over untouched.
    pub async fn sync_repo_issues(
        &self,
        target: &RepoTarget,
        existing: Option<&RepoSnapshot>,
    ) -> (Option<RepoSnapshot>, SyncOutcome) {
        let key = target.key();
        let since = existing.and_then(|s| s.last_sync);
        match since {
            Some(since) => tracing::info!(repo = %key, %since, "syncing repository issues"),
            None => tracing::info!(repo = %key, "syncing repository issues (full sync)"),
        }

        let fetched = match self.client.issues(&target.owner, &target.repo, since).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(repo = %key, error = %e, "issue fetch failed");
                return (None, SyncOutcome::failed(e.to_string()));
            }
        };
        let rate_limit_remaining = fetched.rate_limit_remaining;

        let issues = match map_issues(&fetched.data, &target.owner, &target.repo) {
            Ok(issues) => issues,
            Err(e) => {
                tracing::warn!(repo = %key, error = %e, "issue mapping failed");
                return (
                    None,
                    SyncOutcome::failed_with_rate_limit(e.to_string(), rate_limit_remaining),
                );
            }
        };

        let records = reconcile_issues(existing, issues, since.is_some());
        let record_count = records.len();

        let snapshot = RepoSnapshot {
            last_sync: Some(Utc::now()),
            issues: records,
            projects: existing.map(|s| s.projects.clone()).unwrap_or_default(),
        };

        tracing::info!(repo = %key, record_count, ?rate_limit_remaining, "issue sync complete");
        (
            Some(snapshot),
            SyncOutcome::ok(record_count, rate_limit_remaining),
        )
    }

    /// Sync one repository's classic projects.
    ///
    /// The endpoint has no incremental filter, so this is always a full
    /// replace of the projects sub-field. The co-located issue list and
    /// the issue watermark are preserved untouched.
    pub async fn sync_repo_projects(
        &self,
        target: &RepoTarget,
        existing: Option<&RepoSnapshot>,
    ) -> (Option<RepoSnapshot>, SyncOutcome) {
        let key = target.key();
        tracing::info!(repo = %key, "syncing repository projects");

        let fetched = match self.client.repo_projects(&target.owner, &target.repo).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(repo = %key, error = %e, "project fetch failed");
                return (None, SyncOutcome::failed(e.to_string()));
            }
        };
        let rate_limit_remaining = fetched.rate_limit_remaining;

        let projects = match map_projects(&fetched.data) {
            Ok(projects) => projects,
            Err(e) => {
                tracing::warn!(repo = %key, error = %e, "project mapping failed");
                return (
                    None,
                    SyncOutcome::failed_with_rate_limit(e.to_string(), rate_limit_remaining),
                );
            }
        };

        let record_count = projects.len();
        let snapshot = RepoSnapshot {
            last_sync: existing.and_then(|s| s.last_sync),
            issues: existing.map(|s| s.issues.clone()).unwrap_or_default(),
            projects,
        };

        (
            Some(snapshot),
            SyncOutcome::ok(record_count, rate_limit_remaining),
        )
    }

    /// Sync one externally configured org- or user-level project.
    ///
    /// The origin only offers a listing endpoint, so the configured project
    /// number is selected out of the owner's list; a missing number is a
    /// target-level failure. Every successful sync replaces the stored
    /// project wholesale.
    pub async fn sync_project(
        &self,
        target: &ProjectTarget,
    ) -> (Option<ProjectSnapshot>, SyncOutcome) {
        let key = target.key();
        tracing::info!(project = %key, "syncing external project");

        let fetched = match self.client.owner_projects(&target.owner, target.kind).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(project = %key, error = %e, "project fetch failed");
                return (None, SyncOutcome::failed(e.to_string()));
            }
        };
        let rate_limit_remaining = fetched.rate_limit_remaining;

        let Some(raw) = fetched.data.iter().find(|p| p.number == target.number) else {
            let error = format!(
                "project #{} not found in {}/{}",
                target.number,
                target.kind.as_str(),
                target.owner
            );
            tracing::warn!(project = %key, %error, "project selection failed");
            return (
                None,
                SyncOutcome::failed_with_rate_limit(error, rate_limit_remaining),
            );
        };

        let project = match map_project(raw) {
            Ok(project) => project,
            Err(e) => {
                tracing::warn!(project = %key, error = %e, "project mapping failed");
                return (
                    None,
                    SyncOutcome::failed_with_rate_limit(e.to_string(), rate_limit_remaining),
                );
            }
        };

        let snapshot = ProjectSnapshot {
            last_sync: Utc::now(),
            project,
        };
        (Some(snapshot), SyncOutcome::ok(1, rate_limit_remaining))
    }
}
