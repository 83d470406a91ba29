//! Batch orchestration over many sync targets.
//!
//! Targets are processed strictly sequentially. The shared per-credential
//! rate limit budget is the reason: this is a correctness requirement, not
//! a throughput shortfall. Each target's sync runs in its own task so that
//! a panic inside one target is converted into a failure outcome and the
//! batch carries on; no error crosses this module's public boundary.

use std::collections::BTreeMap;
use std::future::Future;

use tokio::task::JoinError;
use tokio::time::sleep;

use super::single::SyncEngine;
use super::types::{
    BatchResult, IssueCache, ProjectCache, ProjectSnapshot, ProjectTarget, RepoSnapshot,
    RepoTarget, SyncOutcome,
};
use crate::github::client::ApiClient;

/// Extract a readable message from a panicked task.
fn panic_message(err: JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => {
            if let Some(msg) = payload.downcast_ref::<&str>() {
                format!("unexpected failure: {msg}")
            } else if let Some(msg) = payload.downcast_ref::<String>() {
                format!("unexpected failure: {msg}")
            } else {
                "unexpected failure: sync task panicked".to_string()
            }
        }
        Err(err) => format!("unexpected failure: {err}"),
    }
}

impl<C: ApiClient + Clone + Send + Sync + 'static> SyncEngine<C> {
    /// Sequentially process a list of targets against a snapshot store.
    ///
    /// Successful snapshots are committed into the result map immediately,
    /// so a later target's failure never rolls back earlier work. Disabled
    /// targets are skipped with no transport call and no outcome entry. The
    /// inter-target delay separates consecutive processed targets.
    async fn run_batch<T, S, F, Fut>(
        &self,
        targets: &[T],
        mut cache: BTreeMap<String, S>,
        disabled: impl Fn(&T) -> bool,
        key_of: impl Fn(&T) -> String,
        run: F,
    ) -> BatchResult<S>
    where
        T: Clone,
        S: Clone + Send + 'static,
        F: Fn(SyncEngine<C>, T, Option<S>) -> Fut,
        Fut: Future<Output = (Option<S>, SyncOutcome)> + Send + 'static,
    {
        let mut outcomes = BTreeMap::new();
        let mut first = true;

        for target in targets {
            if disabled(target) {
                tracing::debug!(target = %key_of(target), "target disabled, skipping");
                continue;
            }
            if !first {
                sleep(self.options().inter_target_delay).await;
            }
            first = false;

            let key = key_of(target);
            let existing = cache.get(&key).cloned();
            let task = tokio::spawn(run(self.clone(), target.clone(), existing));

            let outcome = match task.await {
                Ok((snapshot, outcome)) => {
                    if let Some(snapshot) = snapshot {
                        cache.insert(key.clone(), snapshot);
                    }
                    outcome
                }
                Err(err) => {
                    let message = panic_message(err);
                    tracing::error!(target = %key, error = %message, "sync task aborted");
                    SyncOutcome::failed(message)
                }
            };

            if !outcome.success
                && let Some(error) = &outcome.error
            {
                tracing::error!(target = %key, %error, "target sync failed");
            }
            outcomes.insert(key, outcome);
        }

        BatchResult {
            snapshots: cache,
            outcomes,
        }
    }

    /// Sync issues for every enabled repository target.
    ///
    /// Takes the caller's snapshot store by value and returns the updated
    /// copy; persisting it is the caller's concern.
    pub async fn sync_all_repo_issues(
        &self,
        targets: &[RepoTarget],
        cache: IssueCache,
    ) -> BatchResult<RepoSnapshot> {
        let result = self
            .run_batch(
                targets,
                cache,
                |t| t.disabled,
                RepoTarget::key,
                |engine, target, existing| async move {
                    engine.sync_repo_issues(&target, existing.as_ref()).await
                },
            )
            .await;

        tracing::info!(
            succeeded = result.succeeded(),
            failed = result.failed(),
            "issue batch complete"
        );
        result
    }

    /// Sync classic projects for every enabled repository target.
    pub async fn sync_all_repo_projects(
        &self,
        targets: &[RepoTarget],
        cache: IssueCache,
    ) -> BatchResult<RepoSnapshot> {
        let result = self
            .run_batch(
                targets,
                cache,
                |t| t.disabled,
                RepoTarget::key,
                |engine, target, existing| async move {
                    engine.sync_repo_projects(&target, existing.as_ref()).await
                },
            )
            .await;

        tracing::info!(
            succeeded = result.succeeded(),
            failed = result.failed(),
            "repository project batch complete"
        );
        result
    }

    /// Sync every enabled externally configured project.
    pub async fn sync_all_projects(
        &self,
        targets: &[ProjectTarget],
        cache: ProjectCache,
    ) -> BatchResult<ProjectSnapshot> {
        let result = self
            .run_batch(
                targets,
                cache,
                |t| t.disabled,
                ProjectTarget::key,
                |engine, target, _existing| async move { engine.sync_project(&target).await },
            )
            .await;

        tracing::info!(
            succeeded = result.succeeded(),
            failed = result.failed(),
            "external project batch complete"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::error::{GitHubError, Result};
    use crate::github::types::{Fetched, Identity, RawIssue, RawProject, RawUser};
    use crate::sync::types::{OwnerKind, SyncOptions};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn raw_issue(id: u64) -> RawIssue {
        RawIssue {
            id,
            number: id,
            title: format!("issue {id}"),
            body: None,
            state: "open".into(),
            user: RawUser {
                login: "alice".into(),
                avatar_url: String::new(),
            },
            labels: vec![],
            assignee: None,
            milestone: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            html_url: String::new(),
            comments: 0,
            pull_request: None,
        }
    }

    /// Stub transport scripted per repository name.
    #[derive(Clone, Default)]
    struct ScriptedClient {
        /// Repos whose fetch returns an HTTP 500.
        failing: Vec<String>,
        /// Repos whose fetch panics, simulating an unexpected fault.
        panicking: Vec<String>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ApiClient for ScriptedClient {
        async fn issues(
            &self,
            _owner: &str,
            repo: &str,
            _since: Option<chrono::DateTime<Utc>>,
        ) -> Result<Fetched<Vec<RawIssue>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.panicking.iter().any(|r| r == repo) {
                panic!("scripted panic for {repo}");
            }
            if self.failing.iter().any(|r| r == repo) {
                return Err(GitHubError::status(500, "Internal Server Error"));
            }
            Ok(Fetched::new(vec![raw_issue(1)], Some(4000)))
        }

        async fn repo_projects(
            &self,
            _owner: &str,
            _repo: &str,
        ) -> Result<Fetched<Vec<RawProject>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Fetched::new(vec![], Some(4000)))
        }

        async fn owner_projects(
            &self,
            owner: &str,
            _kind: OwnerKind,
        ) -> Result<Fetched<Vec<RawProject>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.iter().any(|r| r == owner) {
                return Err(GitHubError::status(401, "Unauthorized"));
            }
            Ok(Fetched::new(
                vec![RawProject {
                    id: 1,
                    number: 1,
                    name: "Roadmap".into(),
                    body: None,
                    state: "open".into(),
                    creator: RawUser {
                        login: "bob".into(),
                        avatar_url: String::new(),
                    },
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                    html_url: String::new(),
                }],
                Some(4000),
            ))
        }

        async fn validate_token(&self) -> Result<Fetched<Identity>> {
            Ok(Fetched::new(
                Identity {
                    login: "alice".into(),
                    name: None,
                    avatar_url: String::new(),
                },
                Some(4000),
            ))
        }
    }

    fn fast_engine(client: ScriptedClient) -> SyncEngine<ScriptedClient> {
        SyncEngine::with_options(
            client,
            SyncOptions {
                inter_target_delay: Duration::ZERO,
            },
        )
    }

    #[tokio::test]
    async fn test_batch_isolates_panicking_target() {
        let client = ScriptedClient {
            panicking: vec!["two".into()],
            ..Default::default()
        };
        let engine = fast_engine(client);
        let targets = vec![
            RepoTarget::new("octo", "one"),
            RepoTarget::new("octo", "two"),
            RepoTarget::new("octo", "three"),
        ];

        let result = engine
            .sync_all_repo_issues(&targets, IssueCache::new())
            .await;

        assert_eq!(result.total(), 3);
        assert!(result.outcomes["octo/one"].success);
        assert!(result.outcomes["octo/three"].success);
        let failed = &result.outcomes["octo/two"];
        assert!(!failed.success);
        assert!(failed.error.as_ref().unwrap().contains("scripted panic"));
        // Both healthy targets still produced snapshots.
        assert!(result.snapshots.contains_key("octo/one"));
        assert!(result.snapshots.contains_key("octo/three"));
        assert!(!result.snapshots.contains_key("octo/two"));
    }

    #[tokio::test]
    async fn test_failed_target_does_not_roll_back_earlier_success() {
        let client = ScriptedClient {
            failing: vec!["bad".into()],
            ..Default::default()
        };
        let engine = fast_engine(client);
        let targets = vec![RepoTarget::new("octo", "good"), RepoTarget::new("octo", "bad")];

        let result = engine
            .sync_all_repo_issues(&targets, IssueCache::new())
            .await;

        assert_eq!(result.succeeded(), 1);
        assert_eq!(result.failed(), 1);
        assert!(result.snapshots.contains_key("octo/good"));
        assert!(!result.snapshots.contains_key("octo/bad"));
        assert!(
            result.outcomes["octo/bad"]
                .error
                .as_ref()
                .unwrap()
                .contains("500")
        );
    }

    #[tokio::test]
    async fn test_disabled_targets_are_skipped_without_side_effects() {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = ScriptedClient {
            calls: Arc::clone(&calls),
            ..Default::default()
        };
        let engine = fast_engine(client);
        let mut disabled = RepoTarget::new("octo", "off");
        disabled.disabled = true;
        let targets = vec![RepoTarget::new("octo", "on"), disabled];

        let result = engine
            .sync_all_repo_issues(&targets, IssueCache::new())
            .await;

        assert_eq!(result.total(), 1);
        assert!(!result.outcomes.contains_key("octo/off"));
        assert!(!result.snapshots.contains_key("octo/off"));
        // Exactly one transport call, for the enabled target.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_runs_between_consecutive_targets_only() {
        let engine = SyncEngine::new(ScriptedClient::default());
        let targets = vec![
            RepoTarget::new("octo", "one"),
            RepoTarget::new("octo", "two"),
            RepoTarget::new("octo", "three"),
        ];

        let start = tokio::time::Instant::now();
        engine
            .sync_all_repo_issues(&targets, IssueCache::new())
            .await;
        let elapsed = start.elapsed();

        // Two gaps of 100ms for three targets; no trailing sleep.
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_uniform_credential_failure_emerges_per_target() {
        let client = ScriptedClient {
            failing: vec!["acme".into()],
            ..Default::default()
        };
        let engine = fast_engine(client);
        let targets = vec![
            ProjectTarget::new("acme", 1, OwnerKind::Org),
            ProjectTarget::new("acme", 2, OwnerKind::Org),
        ];

        let result = engine.sync_all_projects(&targets, ProjectCache::new()).await;

        assert_eq!(result.failed(), 2);
        for outcome in result.outcomes.values() {
            assert!(outcome.error.as_ref().unwrap().contains("401"));
        }
    }

    #[tokio::test]
    async fn test_existing_cache_entries_survive_the_batch() {
        let engine = fast_engine(ScriptedClient::default());
        let mut cache = IssueCache::new();
        cache.insert("other/repo".into(), RepoSnapshot::default());
        let targets = vec![RepoTarget::new("octo", "one")];

        let result = engine.sync_all_repo_issues(&targets, cache).await;

        // Entries for targets outside this batch are passed through intact.
        assert!(result.snapshots.contains_key("other/repo"));
        assert!(result.snapshots.contains_key("octo/one"));
    }
}
