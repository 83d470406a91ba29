//! Conversion from raw GitHub API payloads to canonical records.
//!
//! This is the single translation point for the untyped wire boundary.
//! Mapping is pure: legitimately absent optional fields become canonical
//! absence, never a sentinel. Only malformed required data errors, and a
//! malformed record fails its whole batch — targets are synced atomically.

use crate::entity::{Author, Issue, Label, Milestone, Project, RecordState, RepoRef};
use crate::github::error::{GitHubError, Result};
use crate::github::types::{RawIssue, RawMilestone, RawProject, RawUser};

fn map_user(user: &RawUser) -> Author {
    Author {
        login: user.login.clone(),
        avatar_url: user.avatar_url.clone(),
    }
}

fn map_state(value: &str, context: &str) -> Result<RecordState> {
    RecordState::parse(value)
        .ok_or_else(|| GitHubError::malformed(format!("unknown state {value:?} on {context}")))
}

fn map_milestone(milestone: &RawMilestone) -> Result<Milestone> {
    Ok(Milestone {
        title: milestone.title.clone(),
        description: milestone.description.clone(),
        state: map_state(&milestone.state, "milestone")?,
    })
}

/// Convert a raw issue into the canonical shape.
///
/// The caller is expected to have filtered pull requests out already via
/// [`RawIssue::is_real_issue`]; this function does not re-check.
pub fn map_issue(raw: &RawIssue, owner: &str, repo: &str) -> Result<Issue> {
    Ok(Issue {
        id: raw.id,
        number: raw.number,
        title: raw.title.clone(),
        body: raw.body.clone().unwrap_or_default(),
        state: map_state(&raw.state, &format!("issue #{}", raw.number))?,
        author: map_user(&raw.user),
        labels: raw
            .labels
            .iter()
            .map(|l| Label {
                name: l.name.clone(),
                color: l.color.clone(),
            })
            .collect(),
        assignee: raw.assignee.as_ref().map(map_user),
        milestone: raw.milestone.as_ref().map(map_milestone).transpose()?,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        html_url: raw.html_url.clone(),
        comments: raw.comments,
        repository: RepoRef {
            owner: owner.to_string(),
            name: repo.to_string(),
        },
    })
}

/// Convert a raw classic project into the canonical shape.
pub fn map_project(raw: &RawProject) -> Result<Project> {
    Ok(Project {
        id: raw.id,
        number: raw.number,
        title: raw.name.clone(),
        body: raw.body.clone(),
        state: map_state(&raw.state, &format!("project #{}", raw.number))?,
        creator: map_user(&raw.creator),
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        html_url: raw.html_url.clone(),
    })
}

/// Filter pull requests out of an issue listing and map the remainder.
///
/// Fails atomically: one malformed record fails the whole batch.
pub fn map_issues(raw: &[RawIssue], owner: &str, repo: &str) -> Result<Vec<Issue>> {
    raw.iter()
        .filter(|r| r.is_real_issue())
        .map(|r| map_issue(r, owner, repo))
        .collect()
}

/// Map a batch of raw projects, failing atomically on the first bad record.
pub fn map_projects(raw: &[RawProject]) -> Result<Vec<Project>> {
    raw.iter().map(map_project).collect()
}
