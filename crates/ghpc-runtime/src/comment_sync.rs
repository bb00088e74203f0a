use std::sync::Arc;

use chrono::Utc;
use ghpc_comments::comment_filter::comments_for_slot;
use ghpc_comments::comment_slot::CommentLayout;
use ghpc_comments::output_split::split_output;
use tokio::sync::watch;

use crate::pull_request_api::PullRequestApi;
use crate::remote_error::PrCommentError;
use crate::repo_ref::PullRequestRef;
use crate::retry_policy::RetryPolicy;

#[derive(Debug, Clone, Copy)]
/// One upsert of a comment slot on a pull request.
pub struct UpsertRequest<'a> {
    pub target: &'a PullRequestRef,
    pub layout: &'a CommentLayout,
    pub message: &'a str,
    pub max_part_chars: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpsertReport {
    pub listed: usize,
    pub matched: usize,
    pub minimized: usize,
    pub skipped_already_minimized: usize,
    pub created_comment_ids: Vec<u64>,
}

#[derive(Clone)]
/// Comment protocol for one invocation: list, filter, minimize, split, create.
pub struct PrCommentSync {
    api: Arc<dyn PullRequestApi>,
    retry_policy: RetryPolicy,
    cancel_rx: watch::Receiver<bool>,
}

impl PrCommentSync {
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

    pub(crate) fn api(&self) -> &dyn PullRequestApi {
        self.api.as_ref()
    }

    pub(crate) fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    pub(crate) fn cancel_rx(&self) -> &watch::Receiver<bool> {
        &self.cancel_rx
    }

    /// Replace the slot's visible comments with fresh ones carrying `message`.
    ///
    /// Fails fast: a listing or minimize failure creates nothing, and a
    /// create failure leaves earlier parts posted.
    pub async fn upsert(&self, request: UpsertRequest<'_>) -> Result<UpsertReport, PrCommentError> {
        let UpsertRequest {
            target,
            layout,
            message,
            max_part_chars,
        } = request;

        let comments = self.list_comments(target).await?;
        let matched = comments_for_slot(&comments, &layout.slot);
        tracing::info!(
            pull_request = %target,
            title = layout.slot.title(),
            identifier = layout.slot.identifier(),
            listed = comments.len(),
            matched = matched.len(),
            "resolved comment slot"
        );
        let minimize = self.minimize_comments(&matched).await?;

        let mut parts = split_output(message, max_part_chars);
        if parts.is_empty() {
            parts.push("");
        }
        let total = parts.len();
        let rendered_at = Utc::now();
        let api = self.api();
        let repo = &target.repo;
        let pr_number = target.number;
        let mut created_comment_ids = Vec::with_capacity(total);
        for (index, part) in parts.into_iter().enumerate() {
            let part_number = index + 1;
            let body = layout.render_part(part_number, part, rendered_at);
            let body = body.as_str();
            let created = self
                .retry_policy
                .run("create comment", &self.cancel_rx, move || {
                    api.create_comment(repo, pr_number, body)
                })
                .await
                .map_err(|failure| PrCommentError::create(target, part_number, total, failure))?;
            tracing::info!(
                pull_request = %target,
                part = part_number,
                total,
                comment_id = created.id,
                url = created.html_url.as_deref().unwrap_or("unknown"),
                "created output comment"
            );
            created_comment_ids.push(created.id);
        }

        Ok(UpsertReport {
            listed: comments.len(),
            matched: matched.len(),
            minimized: minimize.minimized,
            skipped_already_minimized: minimize.skipped_already_minimized,
            created_comment_ids,
        })
    }
}
