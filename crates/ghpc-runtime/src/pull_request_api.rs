use async_trait::async_trait;
use ghpc_comments::comment_types::PullRequestComment;
use ghpc_comments::commit_status::CommitState;
use serde::{Deserialize, Serialize};

use crate::remote_error::RemoteCallError;
use crate::repo_ref::RepoRef;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Response of a successful comment creation.
pub struct CreatedComment {
    pub id: u64,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Body of `POST /repos/{owner}/{repo}/statuses/{sha}`.
pub struct CommitStatusPayload {
    pub state: CommitState,
    pub description: String,
    pub context: String,
}

impl CommitStatusPayload {
    pub fn new(state: CommitState, context: &str) -> Self {
        Self {
            state,
            description: state.description().to_string(),
            context: context.to_string(),
        }
    }
}

#[async_trait]
/// Single-attempt GitHub operations used by the comment protocol.
///
/// Implementations never retry; callers wrap each call in a
/// [`RetryPolicy`](crate::RetryPolicy).
pub trait PullRequestApi: Send + Sync {
    async fn list_comments_page(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequestComment>, RemoteCallError>;

    async fn create_comment(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        body: &str,
    ) -> Result<CreatedComment, RemoteCallError>;

    /// Collapse a comment with the `OUTDATED` classifier.
    async fn minimize_comment(&self, node_id: &str) -> Result<(), RemoteCallError>;

    async fn update_comment_body(&self, node_id: &str, body: &str) -> Result<(), RemoteCallError>;

    async fn create_commit_status(
        &self,
        repo: &RepoRef,
        sha: &str,
        status: &CommitStatusPayload,
    ) -> Result<(), RemoteCallError>;
}
