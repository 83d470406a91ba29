//! GitHub API error types.

use thiserror::Error;

/// Errors that can occur when fetching or mapping GitHub data.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The origin answered with a non-2xx status.
    #[error("GitHub API error: HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Connectivity failure before any status was received.
    #[error("network error: {message}")]
    Network { message: String },

    /// The origin returned a record that violates the canonical shape
    /// (e.g. a state outside {open, closed}). An entire fetch is treated
    /// atomically, so one malformed record fails the target's cycle.
    #[error("malformed record: {message}")]
    MalformedRecord { message: String },
}

impl GitHubError {
    #[inline]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    #[inline]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            message: message.into(),
        }
    }

    /// The HTTP status carried by this error, when one was received.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::status(status.as_u16(), err.to_string()),
            None => Self::network(err.to_string()),
        }
    }
}

/// Result type for GitHub API operations.
pub type Result<T> = std::result::Result<T, GitHubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status() {
        let err = GitHubError::status(404, "Not Found");
        assert_eq!(err.http_status(), Some(404));

        let err = GitHubError::network("connection refused");
        assert_eq!(err.http_status(), None);

        let err = GitHubError::malformed("unknown state");
        assert_eq!(err.http_status(), None);
    }

    #[test]
    fn test_display_carries_message() {
        let err = GitHubError::status(403, "rate limited");
        let text = err.to_string();
        assert!(text.contains("403"));
        assert!(text.contains("rate limited"));
    }
}
