use ghpc_comments::comment_slot::{append_minimized_marker, extract_part_number, is_minimized_body};
use ghpc_comments::comment_types::PullRequestComment;

use crate::comment_sync::PrCommentSync;
use crate::remote_error::PrCommentError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MinimizeReport {
    pub minimized: usize,
    pub skipped_already_minimized: usize,
}

impl PrCommentSync {
    /// Collapse each stale comment as outdated, then tag its body so later
    /// runs skip it. Comments already carrying the tag cost no API call.
    ///
    /// Stops at the first comment that cannot be collapsed or tagged.
    pub async fn minimize_comments(
        &self,
        comments: &[&PullRequestComment],
    ) -> Result<MinimizeReport, PrCommentError> {
        let api = self.api();
        let mut report = MinimizeReport::default();
        for comment in comments {
            let body = comment.body_text();
            if is_minimized_body(body) {
                report.skipped_already_minimized = report.skipped_already_minimized.saturating_add(1);
                tracing::debug!(comment_id = comment.id, "comment already minimized; skipping");
                continue;
            }

            let node_id = comment.node_id.as_str();
            self.retry_policy()
                .run("minimize comment", self.cancel_rx(), move || {
                    api.minimize_comment(node_id)
                })
                .await
                .map_err(|failure| PrCommentError::minimize(node_id, failure))?;

            let tagged_body = append_minimized_marker(body);
            let tagged_body = tagged_body.as_str();
            self.retry_policy()
                .run("tag minimized comment", self.cancel_rx(), move || {
                    api.update_comment_body(node_id, tagged_body)
                })
                .await
                .map_err(|failure| PrCommentError::minimize(node_id, failure))?;

            report.minimized = report.minimized.saturating_add(1);
            tracing::info!(
                comment_id = comment.id,
                author = comment.author_login(),
                part = ?extract_part_number(body),
                "minimized stale comment"
            );
        }
        Ok(report)
    }
}
