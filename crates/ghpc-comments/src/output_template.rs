pub const OUTPUT_PLACEHOLDER: &str = "---OUTPUT---";

const COLLAPSIBLE_DIFF_TEMPLATE: &str =
    "\n<details><summary>Show Output</summary>\n\n```diff\n---OUTPUT---\n```\n</details>\n";

/// Commands that already emit markdown and are posted without a wrapper.
const MARKDOWN_NATIVE_COMMANDS: &[&str] = &["trivy", "tflint"];

/// Built-in template used when no template file is configured on disk.
pub fn default_output_template(command: &str) -> &'static str {
    let command = command.to_ascii_lowercase();
    if MARKDOWN_NATIVE_COMMANDS
        .iter()
        .any(|native| command.contains(native))
    {
        OUTPUT_PLACEHOLDER
    } else {
        COLLAPSIBLE_DIFF_TEMPLATE
    }
}

/// Substitute the first placeholder in `template` with `output`.
///
/// Templates without a placeholder keep their text and get the output
/// appended on its own line.
pub fn render_output_template(template: &str, output: &str) -> String {
    if template.contains(OUTPUT_PLACEHOLDER) {
        return template.replacen(OUTPUT_PLACEHOLDER, output, 1);
    }
    if template.trim().is_empty() {
        return output.to_string();
    }
    format!("{}\n{output}", template.trim_end())
}
