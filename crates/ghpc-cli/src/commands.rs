use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use ghpc_comments::commit_status::CommitState;
use ghpc_runtime::{
    CommitStatusReporter, GithubApiClient, PrCommentSync, PullRequestApi, UpsertReport,
    UpsertRequest,
};
use tokio::sync::watch;

use crate::cli_args::{Cli, CliCommand};
use crate::command_exec::{read_scratch_output, run_command, write_scratch_output};
use crate::run_config::RunConfig;

struct GithubServices {
    comments: PrCommentSync,
    statuses: CommitStatusReporter,
}

impl GithubServices {
    fn connect(config: &RunConfig, cancel_rx: watch::Receiver<bool>) -> Result<Self> {
        let api: Arc<dyn PullRequestApi> = Arc::new(GithubApiClient::new(config.github.clone())?);
        Ok(Self {
            comments: PrCommentSync::new(api.clone(), config.retry_policy, cancel_rx.clone()),
            statuses: CommitStatusReporter::new(api, config.retry_policy, cancel_rx),
        })
    }

    async fn post_status(&self, config: &RunConfig, sha: &str, state: CommitState) -> Result<()> {
        let context = config.status_context();
        self.statuses
            .post(&config.target.repo, sha, state, &context)
            .await
            .with_context(|| format!("failed to report {state} for {}", config.command_name))
    }

    async fn upsert_output(&self, config: &RunConfig, message: &str) -> Result<UpsertReport> {
        let layout = config.load_layout().await?;
        self.comments
            .upsert(UpsertRequest {
                target: &config.target,
                layout: &layout,
                message,
                max_part_chars: config.max_part_chars,
            })
            .await
            .with_context(|| format!("failed to comment {} output", config.command_name))
    }
}

fn spawn_cancel_on_ctrl_c() -> watch::Receiver<bool> {
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; cancelling in-flight GitHub calls");
            let _ = cancel_tx.send(true);
        }
    });
    cancel_rx
}

pub(crate) async fn run_cli(cli: Cli) -> Result<()> {
    let cancel_rx = spawn_cancel_on_ctrl_c();
    match &cli.command {
        CliCommand::Exec { command } => {
            let program = command
                .first()
                .ok_or_else(|| anyhow!("no command given to execute"))?;
            let config = RunConfig::from_cli(&cli, program)?;
            execute_and_report(&config, command, cancel_rx).await
        }
        CliCommand::Comment { command } => {
            let config = RunConfig::from_cli(&cli, command)?;
            comment_saved_output(&config, cancel_rx).await
        }
        CliCommand::Status { state, command } => {
            let config = RunConfig::from_cli(&cli, command)?;
            report_status(&config, *state, cancel_rx).await
        }
    }
}

fn log_upsert(config: &RunConfig, report: &UpsertReport) {
    tracing::info!(
        pull_request = %config.target,
        command = %config.command_name,
        matched = report.matched,
        minimized = report.minimized,
        skipped = report.skipped_already_minimized,
        parts = report.created_comment_ids.len(),
        "pull request comment updated"
    );
}

/// Run the command, comment its output, and move the commit status from
/// pending to a terminal state.
///
/// Remote failures after the command started do not stop the remaining steps.
/// A failed command reports its exit alongside every step error; otherwise the
/// first step error is returned once the terminal status has been attempted.
async fn execute_and_report(
    config: &RunConfig,
    argv: &[String],
    cancel_rx: watch::Receiver<bool>,
) -> Result<()> {
    let sha = config.require_head_commit()?;
    let services = GithubServices::connect(config, cancel_rx)?;
    let mut step_errors = Vec::new();

    if let Err(error) = services.post_status(config, sha, CommitState::Pending).await {
        tracing::warn!(error = %format!("{error:#}"), "pending status not posted");
        step_errors.push(error);
    }

    let output = match run_command(argv).await {
        Ok(output) => output,
        Err(error) => {
            if let Err(status_error) = services.post_status(config, sha, CommitState::Failure).await {
                tracing::warn!(error = %format!("{status_error:#}"), "failure status not posted");
            }
            return Err(error);
        }
    };
    {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(output.combined.as_bytes())
            .and_then(|()| stdout.flush())
            .context("failed to echo command output")?;
    }

    let scratch_path = config.scratch_output_path();
    if let Err(error) = write_scratch_output(&scratch_path, &output.combined).await {
        tracing::warn!(error = %format!("{error:#}"), "scratch output not saved");
        step_errors.push(error);
    }

    let commented = match services.upsert_output(config, &output.combined).await {
        Ok(report) => {
            log_upsert(config, &report);
            true
        }
        Err(error) => {
            tracing::warn!(error = %format!("{error:#}"), "output comment not posted");
            step_errors.push(error);
            false
        }
    };

    let final_state = CommitState::from_exit_success(output.success && commented);
    if let Err(error) = services.post_status(config, sha, final_state).await {
        tracing::warn!(error = %format!("{error:#}"), "terminal status not posted");
        step_errors.push(error);
    }

    if !output.success {
        let code = output
            .exit_code
            .map_or_else(|| "a signal".to_string(), |code| format!("status {code}"));
        let mut message = format!("command '{}' exited with {code}", config.command_name);
        for error in &step_errors {
            message.push_str(&format!("; {error:#}"));
        }
        return Err(anyhow!(message));
    }
    match step_errors.into_iter().next() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

async fn comment_saved_output(config: &RunConfig, cancel_rx: watch::Receiver<bool>) -> Result<()> {
    let message = read_scratch_output(&config.scratch_output_path()).await?;
    let services = GithubServices::connect(config, cancel_rx)?;
    let report = services.upsert_output(config, &message).await?;
    log_upsert(config, &report);
    Ok(())
}

async fn report_status(
    config: &RunConfig,
    state: CommitState,
    cancel_rx: watch::Receiver<bool>,
) -> Result<()> {
    let sha = config.require_head_commit()?;
    let services = GithubServices::connect(config, cancel_rx)?;
    services.post_status(config, sha, state).await
}
