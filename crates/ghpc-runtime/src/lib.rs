//! Remote side of the ghpc pull-request commenter.
//!
//! Provides the GitHub API seam and its reqwest implementation, the shared
//! retry policy, and the comment lister, minimizer, upsert orchestrator, and
//! commit status reporter built on top of them.

mod comment_lister;
mod comment_minimizer;
mod comment_sync;
mod github_api_client;
mod pull_request_api;
mod remote_error;
mod repo_ref;
mod retry_policy;
mod status_reporter;

pub use comment_lister::{list_all_comments, COMMENTS_PAGE_SIZE};
pub use comment_minimizer::MinimizeReport;
pub use comment_sync::{PrCommentSync, UpsertReport, UpsertRequest};
pub use github_api_client::{GithubApiClient, GithubApiConfig};
pub use pull_request_api::{CommitStatusPayload, CreatedComment, PullRequestApi};
pub use remote_error::{PrCommentError, RemoteCallError};
pub use repo_ref::{PullRequestRef, RepoRef};
pub use retry_policy::{no_cancellation, RetryFailure, RetryPolicy};
pub use status_reporter::CommitStatusReporter;
