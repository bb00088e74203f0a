use crate::comment_slot::CommentSlot;
use crate::comment_types::PullRequestComment;

/// Return true when `body` carries both slot substrings.
pub fn body_matches_slot(body: &str, title: &str, identifier: &str) -> bool {
    body.contains(title) && body.contains(identifier)
}

/// Select comments whose body contains both `title` and `identifier`,
/// preserving input order.
pub fn filter_comments_by_slot<'a>(
    comments: &'a [PullRequestComment],
    title: &str,
    identifier: &str,
) -> Vec<&'a PullRequestComment> {
    comments
        .iter()
        .filter(|comment| body_matches_slot(comment.body_text(), title, identifier))
        .collect()
}

/// Slot-aware wrapper around [`filter_comments_by_slot`].
pub fn comments_for_slot<'a>(
    comments: &'a [PullRequestComment],
    slot: &CommentSlot,
) -> Vec<&'a PullRequestComment> {
    filter_comments_by_slot(comments, slot.title(), &slot.identifier_needle())
}

#[cfg(test)]
mod tests {
    use super::{body_matches_slot, comments_for_slot, filter_comments_by_slot};
    use crate::comment_slot::CommentSlot;
    use crate::comment_types::PullRequestComment;

    fn comment(id: u64, body: Option<&str>) -> PullRequestComment {
        PullRequestComment {
            id,
            node_id: format!("IC_{id}"),
            body: body.map(str::to_string),
            user: None,
            created_at: None,
        }
    }

    #[test]
    fn unit_body_matches_slot_requires_both_substrings() {
        assert!(body_matches_slot("## a output\nPart #1", "## a output", "Part #1"));
        assert!(!body_matches_slot("## a output", "## a output", "Part #1"));
        assert!(!body_matches_slot("Part #1", "## a output", "Part #1"));
    }

    #[test]
    fn functional_filter_comments_by_slot_preserves_input_order() {
        let comments = vec![
            comment(3, Some("T x I")),
            comment(1, Some("unrelated")),
            comment(2, Some("I then T")),
        ];
        let matched = filter_comments_by_slot(&comments, "T", "I");
        let ids = matched.iter().map(|comment| comment.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn regression_filter_excludes_title_only_identifier_only_and_empty_bodies() {
        let slot = CommentSlot::for_command("tflint", "myproj-default");
        let comments = vec![
            comment(1, Some("## tflint output\nno marker")),
            comment(2, Some("<!-- Part #1 myproj-default -->")),
            comment(3, None),
            comment(4, Some("## tflint output\n<!-- Part #1 myproj-default -->")),
        ];
        let matched = comments_for_slot(&comments, &slot);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, 4);
    }

    #[test]
    fn integration_independent_slots_do_not_collide() {
        let tflint = CommentSlot::for_command("tflint", "myproj-default");
        let trivy = CommentSlot::for_command("trivy", "myproj-default");
        let other_project = CommentSlot::for_command("tflint", "other-default");
        let comments = vec![
            comment(1, Some("## tflint output\n<!-- Part #1 myproj-default -->")),
            comment(2, Some("## trivy output\n<!-- Part #1 myproj-default -->")),
            comment(3, Some("## tflint output\n<!-- Part #1 other-default -->")),
        ];
        assert_eq!(comments_for_slot(&comments, &tflint)[0].id, 1);
        assert_eq!(comments_for_slot(&comments, &trivy)[0].id, 2);
        assert_eq!(comments_for_slot(&comments, &other_project)[0].id, 3);
        assert!(comments_for_slot(&comments, &tflint).len() == 1);
    }
}
