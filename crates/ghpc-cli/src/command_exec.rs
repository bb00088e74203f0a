use std::path::Path;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Captured result of one wrapped command run.
pub struct CommandOutput {
    /// stdout followed by stderr, lossily decoded.
    pub combined: String,
    pub success: bool,
    pub exit_code: Option<i32>,
}

pub async fn run_command(argv: &[String]) -> Result<CommandOutput> {
    let Some((program, args)) = argv.split_first() else {
        bail!("no command given to execute");
    };
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .with_context(|| format!("failed to spawn command '{program}'"))?;
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(CommandOutput {
        combined,
        success: output.status.success(),
        exit_code: output.status.code(),
    })
}

pub async fn write_scratch_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}

pub async fn read_scratch_output(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read saved output {}", path.display()))
}
