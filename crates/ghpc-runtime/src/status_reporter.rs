use std::sync::Arc;

use ghpc_comments::commit_status::CommitState;
use tokio::sync::watch;

use crate::pull_request_api::{CommitStatusPayload, PullRequestApi};
use crate::remote_error::PrCommentError;
use crate::repo_ref::RepoRef;
use crate::retry_policy::RetryPolicy;

#[derive(Clone)]
/// Posts commit statuses; independent of the comment flow.
pub struct CommitStatusReporter {
    api: Arc<dyn PullRequestApi>,
    retry_policy: RetryPolicy,
    cancel_rx: watch::Receiver<bool>,
}

impl CommitStatusReporter {
    pub fn new(
        api: Arc<dyn PullRequestApi>,
        retry_policy: RetryPolicy,
        cancel_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            api,
            retry_policy,
            cancel_rx,
        }
    }

    pub async fn post(
        &self,
        repo: &RepoRef,
        sha: &str,
        state: CommitState,
        context: &str,
    ) -> Result<(), PrCommentError> {
        let api = self.api.as_ref();
        let payload = CommitStatusPayload::new(state, context);
        let payload = &payload;
        self.retry_policy
            .run("create commit status", &self.cancel_rx, move || {
                api.create_commit_status(repo, sha, payload)
            })
            .await
            .map_err(|failure| PrCommentError::status(context, sha, failure))?;
        tracing::info!(
            repo = %repo.as_slug(),
            sha,
            state = state.as_str(),
            context,
            "posted commit status"
        );
        Ok(())
    }
}
