//! Shared output formatting for taskboard commands.
//!
//! Commands render either a human report on stdout or, with `--json`, one
//! envelope object: `{schema_version, command, status, data|error, ...}`.

use serde::Serialize;

use crate::error::{exit_codes, Error, Result};

pub const SCHEMA_VERSION: &str = "taskboard.v1";

/// Global flags that consume the following argument.
const VALUE_FLAGS: [&str; 3] = ["--dir", "--user", "--password"];

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

#[derive(Serialize)]
struct SuccessEnvelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    data: &'a T,
    #[serde(skip_serializing_if = "no_items")]
    warnings: &'a [String],
    #[serde(skip_serializing_if = "no_items")]
    next_steps: &'a [String],
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    error: ErrorBody<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let payload = SuccessEnvelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings: human.map(|h| h.warnings.as_slice()).unwrap_or_default(),
            next_steps: human.map(|h| h.next_steps.as_slice()).unwrap_or_default(),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    if json {
        let message = err.to_string();
        let payload = ErrorEnvelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &message,
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            },
            next_steps,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = vec![output.header.clone()];

    if !output.summary.is_empty() {
        lines.push(String::new());
        lines.push("Summary:".to_string());
        for (key, value) in &output.summary {
            if value.is_empty() {
                lines.push(format!("- {key}"));
            } else {
                lines.push(format!("- {key}: {value}"));
            }
        }
    }
    push_section(&mut lines, "Details", &output.details);
    push_section(&mut lines, "Warnings", &output.warnings);
    push_section(&mut lines, "Next steps", &output.next_steps);

    lines.join("\n")
}

pub fn infer_command_name_from_args() -> String {
    infer_command_name(std::env::args().skip(1))
}

/// Command label for error envelopes, e.g. `task new` or `dashboard`.
pub fn infer_command_name<I>(args: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut words = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        words.push(arg);
        let grouped = matches!(words[0].as_str(), "task" | "user");
        if words.len() == 2 || !grouped {
            break;
        }
    }

    if words.is_empty() {
        "taskboard".to_string()
    } else {
        words.join(" ")
    }
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        exit_codes::USER_ERROR => "user_error",
        exit_codes::NOT_AUTHENTICATED => "not_authenticated",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::NotAuthenticated => vec![
            "taskboard user login <name> --password <password>".to_string(),
            "taskboard user signup <name> --password <password>".to_string(),
        ],
        Error::InvalidCredentials(name) => vec![
            format!("taskboard user login {name} --password <password>"),
            format!("taskboard user signup {name} --password <password>"),
        ],
        Error::UserNotFound(name) => {
            vec![format!("taskboard user signup {name} --password <password>")]
        }
        Error::UserExists(name) => vec![format!("taskboard user login {name} --password <password>")],
        Error::TaskNotFound(_) => vec!["taskboard task list".to_string()],
        Error::InvalidConfig(_) => vec!["fix .taskboard.toml then retry".to_string()],
        _ => Vec::new(),
    }
}

fn no_items(items: &&[String]) -> bool {
    items.is_empty()
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn infers_grouped_and_plain_commands() {
        assert_eq!(infer_command_name(args(&["task", "new", "Buy milk"])), "task new");
        assert_eq!(infer_command_name(args(&["--json", "dashboard"])), "dashboard");
        assert_eq!(
            infer_command_name(args(&["--dir", "/tmp/x", "--user", "bob", "user", "whoami"])),
            "user whoami"
        );
        assert_eq!(
            infer_command_name(args(&["--password", "hunter22", "user", "login", "bob"])),
            "user login"
        );
        assert_eq!(infer_command_name(args(&["--json"])), "taskboard");
    }

    #[test]
    fn human_output_sections() {
        let mut human = HumanOutput::new("Dashboard");
        human.push_summary("Total", "3");
        human.push_detail("one");
        human.push_warning("careful");
        human.push_next_step("taskboard task list");

        let text = format_human(&human);
        assert!(text.starts_with("Dashboard\n\nSummary:\n- Total: 3"));
        assert!(text.contains("Details:\n- one"));
        assert!(text.contains("Warnings:\n- careful"));
        assert!(text.contains("Next steps:\n- taskboard task list"));
    }

    #[test]
    fn error_kinds_follow_exit_codes() {
        assert_eq!(error_kind(&Error::NotAuthenticated), "not_authenticated");
        assert_eq!(error_kind(&Error::TaskNotFound("x".to_string())), "user_error");
        assert_eq!(
            error_kind(&Error::OperationFailed("boom".to_string())),
            "operation_failed"
        );
        assert_eq!(error_next_steps(&Error::NotAuthenticated).len(), 2);
        assert_eq!(
            error_kind(&Error::InvalidCredentials("bob".to_string())),
            "not_authenticated"
        );
    }
}
