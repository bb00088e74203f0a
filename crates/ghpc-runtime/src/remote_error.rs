use std::time::Duration;

use thiserror::Error;

use crate::retry_policy::RetryFailure;

#[derive(Debug, Error)]
/// Failure of a single GitHub API attempt.
pub enum RemoteCallError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("github returned non-success status {status}: {body}")]
    HttpStatus {
        status: u16,
        body: String,
        retry_after: Option<Duration>,
    },
    #[error("graphql errors: {0}")]
    GraphQl(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("operation cancelled")]
    Cancelled,
}

impl RemoteCallError {
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::HttpStatus { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[derive(Debug, Error)]
/// Failures surfaced by the comment protocol once the retry budget is spent.
pub enum PrCommentError {
    #[error("failed to list comments on {target} after {attempts} attempt(s)")]
    List {
        target: String,
        attempts: usize,
        #[source]
        source: RemoteCallError,
    },
    #[error("failed to minimize stale comment {node_id} after {attempts} attempt(s)")]
    Minimize {
        node_id: String,
        attempts: usize,
        #[source]
        source: RemoteCallError,
    },
    #[error("failed to create comment part {part}/{total} on {target} after {attempts} attempt(s)")]
    Create {
        target: String,
        part: usize,
        total: usize,
        attempts: usize,
        #[source]
        source: RemoteCallError,
    },
    #[error("failed to post commit status '{context}' for {sha} after {attempts} attempt(s)")]
    Status {
        context: String,
        sha: String,
        attempts: usize,
        #[source]
        source: RemoteCallError,
    },
}

impl PrCommentError {
    pub(crate) fn list(target: impl ToString, failure: RetryFailure) -> Self {
        Self::List {
            target: target.to_string(),
            attempts: failure.attempts,
            source: failure.error,
        }
    }

    pub(crate) fn minimize(node_id: &str, failure: RetryFailure) -> Self {
        Self::Minimize {
            node_id: node_id.to_string(),
            attempts: failure.attempts,
            source: failure.error,
        }
    }

    pub(crate) fn create(
        target: impl ToString,
        part: usize,
        total: usize,
        failure: RetryFailure,
    ) -> Self {
        Self::Create {
            target: target.to_string(),
            part,
            total,
            attempts: failure.attempts,
            source: failure.error,
        }
    }

    pub(crate) fn status(context: &str, sha: &str, failure: RetryFailure) -> Self {
        Self::Status {
            context: context.to_string(),
            sha: sha.to_string(),
            attempts: failure.attempts,
            source: failure.error,
        }
    }

    pub fn attempts(&self) -> usize {
        match self {
            Self::List { attempts, .. }
            | Self::Minimize { attempts, .. }
            | Self::Create { attempts, .. }
            | Self::Status { attempts, .. } => *attempts,
        }
    }

    pub fn remote_error(&self) -> &RemoteCallError {
        match self {
            Self::List { source, .. }
            | Self::Minimize { source, .. }
            | Self::Create { source, .. }
            | Self::Status { source, .. } => source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.remote_error().is_cancelled()
    }
}
