use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ghpc_comments::comment_slot::{
    project_identifier, project_run_details, CommentLayout, CommentSlot,
};
use ghpc_comments::commit_status::status_context;
use ghpc_comments::output_template::default_output_template;
use ghpc_runtime::{GithubApiConfig, PullRequestRef, RepoRef, RetryPolicy};

use crate::cli_args::Cli;

/// Name a command is known by in titles, scratch files, and status contexts.
pub fn command_basename(program: &str) -> String {
    let trimmed = program.trim();
    Path::new(trimmed)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(trimmed)
        .to_string()
}

fn required_flag(value: Option<&str>, flag: &str, env: &str) -> Result<String> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Ok(value.to_string()),
        None => bail!("{flag} (or {env}) is required"),
    }
}

#[derive(Debug, Clone)]
/// Validated settings for one invocation, resolved once from flags and env.
pub struct RunConfig {
    pub target: PullRequestRef,
    pub head_commit: Option<String>,
    pub github: GithubApiConfig,
    pub retry_policy: RetryPolicy,
    pub command_name: String,
    pub project_name: String,
    pub workspace: String,
    pub status_namespace: String,
    pub template_file: PathBuf,
    pub tmp_dir: PathBuf,
    pub max_part_chars: usize,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli, command_name: &str) -> Result<Self> {
        let command_name = command_basename(command_name);
        if command_name.is_empty() {
            bail!("command name must not be empty");
        }
        let owner = required_flag(cli.repo_owner.as_deref(), "--repo-owner", "BASE_REPO_OWNER")?;
        let name = required_flag(cli.repo_name.as_deref(), "--repo-name", "BASE_REPO_NAME")?;
        let repo = RepoRef::new(&owner, &name)?;
        let Some(pull_number) = cli.pull_number else {
            bail!("--pull-number (or PULL_NUM) is required");
        };
        let token = required_flag(cli.github_token.as_deref(), "--github-token", "GITHUB_TOKEN")?;
        let head_commit = cli
            .head_commit
            .as_deref()
            .map(str::trim)
            .filter(|sha| !sha.is_empty())
            .map(str::to_string);

        Ok(Self {
            target: PullRequestRef::new(repo, pull_number),
            head_commit,
            github: GithubApiConfig {
                api_base: cli.github_api_base.clone(),
                graphql_url: cli.github_graphql_url.clone(),
                token,
                request_timeout_ms: cli.request_timeout_ms,
            },
            retry_policy: RetryPolicy::new(cli.retry_max_attempts, cli.retry_base_delay_ms),
            command_name,
            project_name: cli.project_name.trim().to_string(),
            workspace: cli.workspace.trim().to_string(),
            status_namespace: cli.status_context.clone(),
            template_file: cli.template_file.clone(),
            tmp_dir: cli.tmp_dir.clone(),
            max_part_chars: cli.max_part_chars,
        })
    }

    pub fn require_head_commit(&self) -> Result<&str> {
        match self.head_commit.as_deref() {
            Some(sha) => Ok(sha),
            None => bail!("--head-commit (or HEAD_COMMIT) is required to post commit statuses"),
        }
    }

    pub fn status_context(&self) -> String {
        status_context(&self.status_namespace, &self.command_name, &self.project_name)
    }

    pub fn scratch_output_path(&self) -> PathBuf {
        self.tmp_dir
            .join(format!(".output-{}.md", self.command_name))
    }

    /// Build the comment layout, reading the template file when it exists.
    pub async fn load_layout(&self) -> Result<CommentLayout> {
        let template = match tokio::fs::read_to_string(&self.template_file).await {
            Ok(template) => template,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    path = %self.template_file.display(),
                    command = %self.command_name,
                    "template file not found; using built-in template"
                );
                default_output_template(&self.command_name).to_string()
            }
            Err(error) => {
                return Err(error).with_context(|| {
                    format!(
                        "failed to read template file {}",
                        self.template_file.display()
                    )
                })
            }
        };
        let identifier = project_identifier(&self.project_name, &self.workspace);
        Ok(CommentLayout {
            slot: CommentSlot::for_command(&self.command_name, &identifier),
            run_details: project_run_details(&self.project_name, &self.workspace),
            template,
        })
    }
}
