//! GitHub transport and wire-format handling.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - Raw wire-format structs and rate-limit telemetry
//! - [`client`] - The [`ApiClient`] trait and the `reqwest`-backed client
//! - [`convert`] - Conversion from raw payloads to canonical records
//!
//! Syncing lives in [`crate::sync`]; this module only talks to the origin
//! and translates its JSON once.

pub mod client;
pub mod convert;
pub mod error;
pub mod types;

pub use client::{ApiClient, GitHubClient, PER_PAGE, parse_rate_limit_remaining};
pub use convert::{map_issue, map_issues, map_project, map_projects};
pub use error::GitHubError;
pub use types::{Fetched, Identity, RawIssue, RawLabel, RawMilestone, RawProject, RawUser};
