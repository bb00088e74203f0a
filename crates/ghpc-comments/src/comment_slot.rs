use chrono::{DateTime, SecondsFormat, Utc};

use crate::output_template::render_output_template;

pub const PART_MARKER_PREFIX: &str = "<!-- Part #";
pub const UNIQUE_ID_MARKER_PREFIX: &str = "<!-- Unique ID: ";
pub const MARKER_SUFFIX: &str = " -->";
pub const MINIMIZED_MARKER: &str = "<!-- ghpc-minimized -->";
const DEFAULT_PROJECT_IDENTIFIER: &str = "default";

/// Title line shared by every comment posted for `command`.
pub fn command_title(command: &str) -> String {
    let command = command.trim();
    let command = if command.is_empty() { "command" } else { command };
    format!("## {command} output")
}

/// Stable identifier of a project/workspace pair, embedded in part markers.
pub fn project_identifier(project_name: &str, workspace: &str) -> String {
    let project_name = project_name.trim();
    let workspace = workspace.trim();
    match (project_name.is_empty(), workspace.is_empty()) {
        (false, false) => format!("{project_name}-{workspace}"),
        (false, true) => project_name.to_string(),
        (true, false) => workspace.to_string(),
        (true, true) => DEFAULT_PROJECT_IDENTIFIER.to_string(),
    }
}

/// HTML header naming the project and workspace a run belongs to.
pub fn project_run_details(project_name: &str, workspace: &str) -> String {
    let project_name = project_name.trim();
    let workspace = workspace.trim();
    if project_name.is_empty() || workspace.is_empty() {
        return String::new();
    }
    format!("<h3>Project: <code>{project_name}</code> Workspace: <code>{workspace}</code></h3>")
}

pub fn is_minimized_body(body: &str) -> bool {
    body.contains(MINIMIZED_MARKER)
}

/// Append the minimized marker unless the body already carries it.
pub fn append_minimized_marker(body: &str) -> String {
    if is_minimized_body(body) {
        return body.to_string();
    }
    format!("{body}\n\n{MINIMIZED_MARKER}")
}

/// Read the ordinal out of the first part marker in `body`.
pub fn extract_part_number(body: &str) -> Option<usize> {
    let start = body.find(PART_MARKER_PREFIX)? + PART_MARKER_PREFIX.len();
    let digits = body[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>();
    digits.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Logical identity that existing comments are matched against.
///
/// The remote side has no structured slot field, so identity is carried by
/// two substrings: the title line and the identifier inside part markers.
pub struct CommentSlot {
    title: String,
    identifier: String,
}

impl CommentSlot {
    pub fn new(title: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            identifier: identifier.into(),
        }
    }

    pub fn for_command(command: &str, project_identifier: &str) -> Self {
        Self::new(command_title(command), project_identifier.trim())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Substring every part marker of this slot contains.
    pub fn identifier_needle(&self) -> String {
        format!(" {}{MARKER_SUFFIX}", self.identifier)
    }

    pub fn part_marker(&self, part_number: usize) -> String {
        format!(
            "{PART_MARKER_PREFIX}{part_number} {}{MARKER_SUFFIX}",
            self.identifier
        )
    }
}

pub fn unique_id_marker(rendered_at: DateTime<Utc>) -> String {
    format!(
        "{UNIQUE_ID_MARKER_PREFIX}{}{MARKER_SUFFIX}",
        rendered_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Everything needed to turn one output part into a comment body.
pub struct CommentLayout {
    pub slot: CommentSlot,
    pub run_details: String,
    pub template: String,
}

impl CommentLayout {
    pub fn render_part(
        &self,
        part_number: usize,
        output: &str,
        rendered_at: DateTime<Utc>,
    ) -> String {
        let mut body = String::new();
        body.push_str(self.slot.title());
        body.push('\n');
        if !self.run_details.trim().is_empty() {
            body.push_str(self.run_details.trim_end());
            body.push('\n');
        }
        body.push_str(&render_output_template(&self.template, output));
        body.push('\n');
        body.push_str(&self.slot.part_marker(part_number));
        body.push('\n');
        body.push_str(&unique_id_marker(rendered_at));
        body
    }
}
