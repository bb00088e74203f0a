use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use ghpc_comments::comment_filter::comments_for_slot;
use ghpc_comments::comment_slot::{
    is_minimized_body, project_identifier, project_run_details, CommentLayout, CommentSlot,
};
use ghpc_comments::comment_types::{GithubUser, PullRequestComment};
use ghpc_comments::commit_status::{status_context, CommitState};
use ghpc_comments::output_template::default_output_template;
use ghpc_runtime::{
    no_cancellation, CommitStatusPayload, CommitStatusReporter, CreatedComment, PrCommentSync,
    PullRequestApi, PullRequestRef, RemoteCallError, RepoRef, RetryPolicy, UpsertRequest,
};
use tokio::sync::Mutex as AsyncMutex;

struct ThreadComment {
    comment: PullRequestComment,
    collapsed: bool,
}

/// One pull request conversation shared by every simulated CI run.
struct InMemoryPullRequestThread {
    comments: AsyncMutex<Vec<ThreadComment>>,
    statuses: AsyncMutex<Vec<(String, CommitStatusPayload)>>,
    next_id: AtomicU64,
}

impl InMemoryPullRequestThread {
    fn new() -> Self {
        Self {
            comments: AsyncMutex::new(Vec::new()),
            statuses: AsyncMutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    async fn add_human_comment(&self, body: &str) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.comments.lock().await.push(ThreadComment {
            comment: PullRequestComment {
                id,
                node_id: format!("IC_{id}"),
                body: Some(body.to_string()),
                user: Some(GithubUser {
                    login: "reviewer".to_string(),
                }),
                created_at: None,
            },
            collapsed: false,
        });
    }

    async fn visible_bodies(&self, slot: &CommentSlot) -> Vec<String> {
        let comments = self.comments.lock().await;
        let snapshot = comments
            .iter()
            .filter(|entry| !entry.collapsed)
            .map(|entry| entry.comment.clone())
            .collect::<Vec<_>>();
        comments_for_slot(&snapshot, slot)
            .into_iter()
            .map(|comment| comment.body_text().to_string())
            .collect()
    }

    async fn collapsed_count(&self) -> usize {
        let comments = self.comments.lock().await;
        comments
            .iter()
            .filter(|entry| {
                assert_eq!(
                    entry.collapsed,
                    is_minimized_body(entry.comment.body_text()),
                    "collapsed comments must carry the minimized marker"
                );
                entry.collapsed
            })
            .count()
    }
}

#[async_trait]
impl PullRequestApi for InMemoryPullRequestThread {
    async fn list_comments_page(
        &self,
        _repo: &RepoRef,
        _pr_number: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequestComment>, RemoteCallError> {
        let comments = self.comments.lock().await;
        let start = (page.saturating_sub(1) * per_page) as usize;
        Ok(comments
            .iter()
            .skip(start)
            .take(per_page as usize)
            .map(|entry| entry.comment.clone())
            .collect())
    }

    async fn create_comment(
        &self,
        _repo: &RepoRef,
        _pr_number: u64,
        body: &str,
    ) -> Result<CreatedComment, RemoteCallError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.comments.lock().await.push(ThreadComment {
            comment: PullRequestComment {
                id,
                node_id: format!("IC_{id}"),
                body: Some(body.to_string()),
                user: Some(GithubUser {
                    login: "ghpc-bot".to_string(),
                }),
                created_at: None,
            },
            collapsed: false,
        });
        Ok(CreatedComment {
            id,
            node_id: Some(format!("IC_{id}")),
            html_url: None,
        })
    }

    async fn minimize_comment(&self, node_id: &str) -> Result<(), RemoteCallError> {
        let mut comments = self.comments.lock().await;
        let entry = comments
            .iter_mut()
            .find(|entry| entry.comment.node_id == node_id)
            .ok_or_else(|| RemoteCallError::InvalidResponse(format!("unknown node {node_id}")))?;
        entry.collapsed = true;
        Ok(())
    }

    async fn update_comment_body(&self, node_id: &str, body: &str) -> Result<(), RemoteCallError> {
        let mut comments = self.comments.lock().await;
        let entry = comments
            .iter_mut()
            .find(|entry| entry.comment.node_id == node_id)
            .ok_or_else(|| RemoteCallError::InvalidResponse(format!("unknown node {node_id}")))?;
        entry.comment.body = Some(body.to_string());
        Ok(())
    }

    async fn create_commit_status(
        &self,
        _repo: &RepoRef,
        sha: &str,
        status: &CommitStatusPayload,
    ) -> Result<(), RemoteCallError> {
        self.statuses
            .lock()
            .await
            .push((sha.to_string(), status.clone()));
        Ok(())
    }
}

fn target() -> PullRequestRef {
    PullRequestRef::new(RepoRef::parse("owner/repo").expect("repo"), 7)
}

fn layout(command: &str, project: &str, workspace: &str) -> CommentLayout {
    let identifier = project_identifier(project, workspace);
    CommentLayout {
        slot: CommentSlot::for_command(command, &identifier),
        run_details: project_run_details(project, workspace),
        template: default_output_template(command).to_string(),
    }
}

async fn run_once(
    thread: &Arc<InMemoryPullRequestThread>,
    layout: &CommentLayout,
    output: &str,
    max_part_chars: usize,
) {
    let sync = PrCommentSync::new(thread.clone(), RetryPolicy::new(3, 1), no_cancellation());
    sync.upsert(UpsertRequest {
        target: &target(),
        layout,
        message: output,
        max_part_chars,
    })
    .await
    .expect("upsert");
}

#[tokio::test]
async fn integration_repeated_runs_leave_only_the_latest_generation_visible() {
    let thread = Arc::new(InMemoryPullRequestThread::new());
    thread.add_human_comment("Please take a look at the plan").await;
    let tflint = layout("tflint", "myproj", "default");

    let outputs = [
        "warning: unused variable\nwarning: deprecated syntax\n",
        "warning: deprecated syntax\n",
        "no issues found\n",
    ];
    for output in outputs {
        run_once(&thread, &tflint, output, 1_000).await;
    }

    let visible = thread.visible_bodies(&tflint.slot).await;
    assert_eq!(visible.len(), 1);
    assert!(visible[0].contains("no issues found"));
    assert!(visible[0].contains("<!-- Part #1 myproj-default -->"));
    assert_eq!(thread.collapsed_count().await, 2);

    let comments = thread.comments.lock().await;
    assert!(!comments[0].collapsed);
    assert_eq!(
        comments[0].comment.body_text(),
        "Please take a look at the plan"
    );
}

#[tokio::test]
async fn integration_multi_part_output_is_posted_in_order_and_replaced_whole() {
    let thread = Arc::new(InMemoryPullRequestThread::new());
    let terraform = layout("terraform", "network", "prod");
    let long_output = "+ resource \"a\" {}\n+ resource \"b\" {}\n+ resource \"c\" {}\n";

    run_once(&thread, &terraform, long_output, 24).await;
    let first_generation = thread.visible_bodies(&terraform.slot).await;
    assert_eq!(first_generation.len(), 3);
    for (index, body) in first_generation.iter().enumerate() {
        assert!(body.starts_with("## terraform output\n<h3>Project: <code>network</code>"));
        assert!(body.contains(&format!("<!-- Part #{} network-prod -->", index + 1)));
    }

    run_once(&thread, &terraform, "No changes.\n", 24).await;
    let second_generation = thread.visible_bodies(&terraform.slot).await;
    assert_eq!(second_generation.len(), 1);
    assert!(second_generation[0].contains("No changes."));
    assert_eq!(thread.collapsed_count().await, 3);
}

#[tokio::test]
async fn integration_projects_and_commands_sharing_a_pull_request_stay_isolated() {
    let thread = Arc::new(InMemoryPullRequestThread::new());
    let tflint_app = layout("tflint", "app", "default");
    let tflint_db = layout("tflint", "db", "default");
    let trivy_app = layout("trivy", "app", "default");

    run_once(&thread, &tflint_app, "app finding\n", 1_000).await;
    run_once(&thread, &tflint_db, "db finding\n", 1_000).await;
    run_once(&thread, &trivy_app, "trivy finding\n", 1_000).await;
    run_once(&thread, &tflint_app, "app finding fixed\n", 1_000).await;

    let app = thread.visible_bodies(&tflint_app.slot).await;
    assert_eq!(app.len(), 1);
    assert!(app[0].contains("app finding fixed"));
    assert_eq!(thread.visible_bodies(&tflint_db.slot).await.len(), 1);
    assert_eq!(thread.visible_bodies(&trivy_app.slot).await.len(), 1);
    assert_eq!(thread.collapsed_count().await, 1);
}

#[tokio::test]
async fn integration_run_reports_pending_then_terminal_status_on_one_context() {
    let thread = Arc::new(InMemoryPullRequestThread::new());
    let reporter = CommitStatusReporter::new(thread.clone(), RetryPolicy::new(3, 1), no_cancellation());
    let repo = RepoRef::parse("owner/repo").expect("repo");
    let context = status_context("ghpc", "tflint", "myproj");
    let tflint = layout("tflint", "myproj", "default");

    reporter
        .post(&repo, "abc123", CommitState::Pending, &context)
        .await
        .expect("pending");
    run_once(&thread, &tflint, "1 issue(s) found\n", 1_000).await;
    reporter
        .post(&repo, "abc123", CommitState::from_exit_success(false), &context)
        .await
        .expect("failure");

    let statuses = thread.statuses.lock().await;
    let states = statuses
        .iter()
        .map(|(sha, payload)| {
            assert_eq!(sha, "abc123");
            assert_eq!(payload.context, "ghpc/tflint: myproj");
            payload.state
        })
        .collect::<Vec<_>>();
    assert_eq!(states, vec![CommitState::Pending, CommitState::Failure]);
    assert_eq!(statuses[1].1.description, "Failed");
}
