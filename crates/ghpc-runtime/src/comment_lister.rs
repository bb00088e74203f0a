use ghpc_comments::comment_types::PullRequestComment;

use crate::comment_sync::PrCommentSync;
use crate::pull_request_api::PullRequestApi;
use crate::remote_error::{PrCommentError, RemoteCallError};
use crate::repo_ref::{PullRequestRef, RepoRef};

pub const COMMENTS_PAGE_SIZE: u32 = 100;

/// Walk every comment page of a pull request, stopping at the first short page.
///
/// A failed page fails the whole walk; retries restart from page one.
pub async fn list_all_comments(
    api: &dyn PullRequestApi,
    repo: &RepoRef,
    pr_number: u64,
) -> Result<Vec<PullRequestComment>, RemoteCallError> {
    let mut page = 1_u32;
    let mut rows = Vec::new();
    loop {
        let chunk = api
            .list_comments_page(repo, pr_number, page, COMMENTS_PAGE_SIZE)
            .await?;
        let chunk_len = chunk.len();
        rows.extend(chunk);
        if chunk_len < COMMENTS_PAGE_SIZE as usize {
            break;
        }
        page = page.saturating_add(1);
    }
    Ok(rows)
}

impl PrCommentSync {
    pub async fn list_comments(
        &self,
        target: &PullRequestRef,
    ) -> Result<Vec<PullRequestComment>, PrCommentError> {
        let api = self.api();
        let repo = &target.repo;
        let pr_number = target.number;
        let comments = self
            .retry_policy()
            .run("list pull request comments", self.cancel_rx(), move || {
                list_all_comments(api, repo, pr_number)
            })
            .await
            .map_err(|failure| PrCommentError::list(target, failure))?;
        tracing::debug!(
            pull_request = %target,
            comments = comments.len(),
            "listed pull request comments"
        );
        Ok(comments)
    }
}
