use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_STATUS_NAMESPACE: &str = "ghpc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Commit status states a command run moves through.
///
/// `Pending` is posted before the command runs; `Success` and `Failure` are
/// terminal for that run.
pub enum CommitState {
    Pending,
    Success,
    Failure,
}

impl CommitState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Pending => "In Progress",
            Self::Success => "Success",
            Self::Failure => "Failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn from_exit_success(success: bool) -> Self {
        if success {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

impl fmt::Display for CommitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitState {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failure" | "failed" => Ok(Self::Failure),
            other => Err(format!(
                "unsupported commit state '{other}', expected pending, success, or failure"
            )),
        }
    }
}

/// Context key GitHub uses to collapse successive statuses of one run.
pub fn status_context(namespace: &str, command: &str, project_name: &str) -> String {
    let namespace = namespace.trim().trim_end_matches('/');
    let namespace = if namespace.is_empty() {
        DEFAULT_STATUS_NAMESPACE
    } else {
        namespace
    };
    let project_name = project_name.trim();
    if project_name.is_empty() {
        format!("{namespace}/{}", command.trim())
    } else {
        format!("{namespace}/{}: {project_name}", command.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::{status_context, CommitState};

    #[test]
    fn unit_commit_state_descriptions_follow_fixed_mapping() {
        assert_eq!(CommitState::Pending.description(), "In Progress");
        assert_eq!(CommitState::Failure.description(), "Failed");
        assert_eq!(CommitState::Success.description(), "Success");
    }

    #[test]
    fn unit_commit_state_parses_known_values_case_insensitively() {
        assert_eq!("PENDING".parse::<CommitState>(), Ok(CommitState::Pending));
        assert_eq!(" success ".parse::<CommitState>(), Ok(CommitState::Success));
        assert_eq!("failed".parse::<CommitState>(), Ok(CommitState::Failure));
        assert!("error".parse::<CommitState>().is_err());
    }

    #[test]
    fn functional_commit_state_serializes_as_github_wire_value() {
        assert_eq!(
            serde_json::to_value(CommitState::Failure).expect("serialize"),
            serde_json::json!("failure")
        );
        assert!(CommitState::Success.is_terminal());
        assert!(!CommitState::Pending.is_terminal());
        assert_eq!(CommitState::from_exit_success(false), CommitState::Failure);
    }

    #[test]
    fn integration_status_context_matches_namespace_command_project_format() {
        assert_eq!(status_context("ghpc", "tflint", "myproj"), "ghpc/tflint: myproj");
        assert_eq!(status_context("atlantis/", "plan", "infra"), "atlantis/plan: infra");
    }

    #[test]
    fn regression_status_context_defaults_blank_namespace_and_project() {
        assert_eq!(status_context("  ", "trivy", ""), "ghpc/trivy");
    }
}
