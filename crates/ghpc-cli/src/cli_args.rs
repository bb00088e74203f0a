use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ghpc_comments::commit_status::{CommitState, DEFAULT_STATUS_NAMESPACE};
use ghpc_comments::output_split::DEFAULT_MAX_PART_CHARS;

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_commit_state(value: &str) -> Result<CommitState, String> {
    value.parse::<CommitState>()
}

#[derive(Debug, Parser)]
#[command(
    name = "ghpc",
    about = "Post command output to pull request comments and report commit statuses",
    version
)]
pub struct Cli {
    #[arg(
        long = "repo-owner",
        env = "BASE_REPO_OWNER",
        help = "Owner of the repository the pull request belongs to"
    )]
    pub repo_owner: Option<String>,

    #[arg(
        long = "repo-name",
        env = "BASE_REPO_NAME",
        help = "Name of the repository the pull request belongs to"
    )]
    pub repo_name: Option<String>,

    #[arg(
        long = "pull-number",
        env = "PULL_NUM",
        value_parser = parse_positive_u64,
        help = "Pull request number to comment on"
    )]
    pub pull_number: Option<u64>,

    #[arg(
        long = "head-commit",
        env = "HEAD_COMMIT",
        help = "Commit SHA that receives commit statuses"
    )]
    pub head_commit: Option<String>,

    #[arg(
        long = "github-token",
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "GitHub token used for REST and GraphQL calls"
    )]
    pub github_token: Option<String>,

    #[arg(
        long = "project-name",
        env = "PROJECT_NAME",
        default_value = "atlantis",
        help = "Project name shown in run details and status contexts"
    )]
    pub project_name: String,

    #[arg(
        long,
        env = "WORKSPACE",
        default_value = "default",
        help = "Workspace name shown in run details"
    )]
    pub workspace: String,

    #[arg(
        long = "status-context",
        env = "GH_STATUS_CONTEXT",
        default_value = DEFAULT_STATUS_NAMESPACE,
        help = "Namespace prefix for commit status contexts"
    )]
    pub status_context: String,

    #[arg(
        long = "template-file",
        env = "TEMPLATE_FILENAME",
        default_value = "template.md",
        help = "Markdown template containing the ---OUTPUT--- placeholder; the built-in template is used when the file is absent"
    )]
    pub template_file: PathBuf,

    #[arg(
        long = "tmp-dir",
        env = "TMP_GHPC_DIR",
        default_value = "/tmp/ghpc",
        help = "Directory holding per-command scratch output files"
    )]
    pub tmp_dir: PathBuf,

    #[arg(
        long = "max-part-chars",
        env = "GHPC_MAX_PART_CHARS",
        default_value_t = DEFAULT_MAX_PART_CHARS,
        value_parser = parse_positive_usize,
        help = "Maximum characters of output per comment part"
    )]
    pub max_part_chars: usize,

    #[arg(
        long = "github-api-base",
        env = "GHPC_GITHUB_API_BASE",
        default_value = "https://api.github.com",
        help = "GitHub REST API base URL"
    )]
    pub github_api_base: String,

    #[arg(
        long = "github-graphql-url",
        env = "GHPC_GITHUB_GRAPHQL_URL",
        help = "GitHub GraphQL endpoint. Defaults to the endpoint paired with --github-api-base"
    )]
    pub github_graphql_url: Option<String>,

    #[arg(
        long = "request-timeout-ms",
        env = "GHPC_REQUEST_TIMEOUT_MS",
        default_value_t = 30_000,
        value_parser = parse_positive_u64,
        help = "Timeout for each GitHub API request"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "retry-max-attempts",
        env = "GHPC_RETRY_MAX_ATTEMPTS",
        default_value_t = 3,
        value_parser = parse_positive_usize,
        help = "Attempts per GitHub API operation before giving up"
    )]
    pub retry_max_attempts: usize,

    #[arg(
        long = "retry-base-delay-ms",
        env = "GHPC_RETRY_BASE_DELAY_MS",
        default_value_t = 1_000,
        help = "Base delay for exponential backoff between attempts"
    )]
    pub retry_base_delay_ms: u64,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a command, comment its output, and report its commit status.
    Exec {
        #[arg(
            required = true,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "COMMAND"
        )]
        command: Vec<String>,
    },
    /// Comment the saved output of an earlier run of COMMAND.
    Comment {
        #[arg(value_name = "COMMAND")]
        command: String,
    },
    /// Post a single commit status for COMMAND.
    Status {
        #[arg(value_parser = parse_commit_state, value_name = "STATE")]
        state: CommitState,
        #[arg(value_name = "COMMAND")]
        command: String,
    },
}
