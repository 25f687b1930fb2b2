//! taskboard task command implementations.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{NewTask, Priority, Task, TaskRepository, TaskUpdate};

use super::load_context;

pub struct NewOptions {
    pub title: String,
    pub description: Option<String>,
    pub due: Option<String>,
    pub priority: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    /// `Some(true)` completed only, `Some(false)` pending only
    pub completed: Option<bool>,
    pub created_since: Option<String>,
    pub limit: Option<usize>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
    pub due: Option<String>,
    pub clear_due: bool,
    pub priority: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct CompleteOptions {
    pub id: String,
    pub completed: bool,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct DeleteOptions {
    pub id: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// A task as shown to its owner, with overdue state computed for `now`.
#[derive(serde::Serialize)]
struct TaskView {
    #[serde(flatten)]
    task: Task,
    is_overdue: bool,
}

impl TaskView {
    fn new(task: Task, now: DateTime<Utc>) -> Self {
        let is_overdue = task.is_overdue(now);
        Self { task, is_overdue }
    }
}

#[derive(serde::Serialize)]
struct TaskListOutput {
    total: usize,
    tasks: Vec<TaskView>,
}

#[derive(serde::Serialize)]
struct TaskDeletedOutput {
    id: String,
    title: String,
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.user, options.password)?;
    let mut input = NewTask::new(options.title);
    input.description = options.description;
    input.due_at = options
        .due
        .as_deref()
        .map(|value| parse_when("due", value))
        .transpose()?;
    input.priority = options
        .priority
        .as_deref()
        .map(str::parse::<Priority>)
        .transpose()?;

    let task = ctx.store.create(&ctx.user.id, input)?;
    let now = Utc::now();

    let mut human = HumanOutput::new("Task created");
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Priority", task.priority.to_string());
    if let Some(due_at) = task.due_at {
        human.push_summary("Due", format_when(due_at));
        if task.is_overdue(now) {
            human.push_warning("due date is already in the past");
        }
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task new",
        &TaskView::new(task, now),
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.user, options.password)?;
    let created_since = options
        .created_since
        .as_deref()
        .map(|value| parse_when("created-since", value))
        .transpose()?;

    let mut tasks = match (created_since, options.completed) {
        (Some(since), completed) => {
            let mut tasks = ctx.store.find_by_owner_created_after(&ctx.user.id, since)?;
            if let Some(completed) = completed {
                tasks.retain(|task| task.completed == completed);
            }
            tasks
        }
        (None, Some(completed)) => ctx.store.find_by_owner_completed(&ctx.user.id, completed)?,
        (None, None) => ctx.store.find_by_owner(&ctx.user.id)?,
    };
    apply_limit(&mut tasks, options.limit)?;

    let now = Utc::now();
    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Total", tasks.len().to_string());
    if let Some(completed) = options.completed {
        human.push_summary("Filter", if completed { "completed" } else { "pending" });
    }
    for task in &tasks {
        human.push_detail(format_line(task, now));
    }
    if tasks.is_empty() {
        human.push_next_step("taskboard task new <title>");
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tasks: tasks
            .into_iter()
            .map(|task| TaskView::new(task, now))
            .collect(),
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task list",
        &output,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.user, options.password)?;
    let id = ctx.store.resolve_task_id(&ctx.user.id, &options.id)?;
    let task = ctx.store.get(&id, &ctx.user.id)?;
    let now = Utc::now();

    let mut human = HumanOutput::new(format!("Task {}", task.id));
    human.push_summary("Title", task.title.clone());
    human.push_summary("Status", status_label(&task, now));
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary(
        "Due",
        task.due_at.map(format_when).unwrap_or_else(|| "none".to_string()),
    );
    human.push_summary("Created", format_when(task.created_at));
    if let Some(description) = task.description.as_ref() {
        human.push_detail(description.clone());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task show",
        &TaskView::new(task, now),
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.user, options.password)?;

    let mut update = TaskUpdate {
        title: options.title,
        ..TaskUpdate::default()
    };
    if options.clear_description {
        update.description = Some(None);
    } else if let Some(description) = options.description {
        update.description = Some(Some(description));
    }
    if options.clear_due {
        update.due_at = Some(None);
    } else if let Some(due) = options.due.as_deref() {
        update.due_at = Some(Some(parse_when("due", due)?));
    }
    update.priority = options
        .priority
        .as_deref()
        .map(str::parse::<Priority>)
        .transpose()?;
    if update.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to edit: pass --title, --description, --due or --priority".to_string(),
        ));
    }

    let id = ctx.store.resolve_task_id(&ctx.user.id, &options.id)?;
    let task = ctx.store.update(&id, &ctx.user.id, update)?;
    let now = Utc::now();

    let mut human = HumanOutput::new(format!("Task {} updated", task.id));
    human.push_summary("Title", task.title.clone());
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary(
        "Due",
        task.due_at.map(format_when).unwrap_or_else(|| "none".to_string()),
    );

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task edit",
        &TaskView::new(task, now),
        Some(&human),
    )
}

/// `task done` and `task reopen`.
pub fn run_set_completed(options: CompleteOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.user, options.password)?;
    let id = ctx.store.resolve_task_id(&ctx.user.id, &options.id)?;
    let task = ctx
        .store
        .update(&id, &ctx.user.id, TaskUpdate::completed(options.completed))?;
    let now = Utc::now();

    let (command, header) = if options.completed {
        ("task done", format!("Task {} completed", task.id))
    } else {
        ("task reopen", format!("Task {} reopened", task.id))
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("Title", task.title.clone());
    human.push_summary("Status", status_label(&task, now));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        command,
        &TaskView::new(task, now),
        Some(&human),
    )
}

pub fn run_delete(options: DeleteOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.user, options.password)?;
    let id = ctx.store.resolve_task_id(&ctx.user.id, &options.id)?;
    let task = ctx.store.get(&id, &ctx.user.id)?;
    ctx.store.delete(&id, &ctx.user.id)?;

    let mut human = HumanOutput::new(format!("Task {} deleted", task.id));
    human.push_summary("Title", task.title.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task delete",
        &TaskDeletedOutput {
            id: task.id,
            title: task.title,
        },
        Some(&human),
    )
}

fn apply_limit(tasks: &mut Vec<Task>, limit: Option<usize>) -> Result<()> {
    if let Some(limit) = limit {
        if limit == 0 {
            return Err(Error::InvalidArgument("limit must be >= 1".to_string()));
        }
        tasks.truncate(limit);
    }
    Ok(())
}

/// Parse a user-supplied instant.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM` and `YYYY-MM-DD`; the last two are
/// read as UTC, a bare date as midnight.
pub(crate) fn parse_when(label: &str, value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Some(naive) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    Err(Error::InvalidArgument(format!(
        "invalid {label} '{value}': expected RFC 3339, YYYY-MM-DD HH:MM or YYYY-MM-DD"
    )))
}

pub(crate) fn format_when(when: DateTime<Utc>) -> String {
    when.format("%Y-%m-%d %H:%M").to_string()
}

fn status_label(task: &Task, now: DateTime<Utc>) -> &'static str {
    if task.completed {
        "completed"
    } else if task.is_overdue(now) {
        "overdue"
    } else {
        "pending"
    }
}

pub(crate) fn format_line(task: &Task, now: DateTime<Utc>) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!("[{mark}][{}] {} {}", task.priority, task.id, task.title);
    if let Some(due_at) = task.due_at {
        line.push_str(&format!(" (due {})", format_when(due_at)));
        if task.is_overdue(now) {
            line.push_str(" OVERDUE");
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_when_accepts_supported_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 10, 14, 30, 0).unwrap();
        assert_eq!(parse_when("due", "2024-05-10T14:30:00Z").unwrap(), expected);
        assert_eq!(
            parse_when("due", "2024-05-10T16:30:00+02:00").unwrap(),
            expected
        );
        assert_eq!(parse_when("due", " 2024-05-10 14:30 ").unwrap(), expected);
        assert_eq!(
            parse_when("due", "2024-05-10").unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn parse_when_rejects_garbage() {
        let err = parse_when("due", "next tuesday").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().contains("invalid due"));
        assert!(parse_when("due", "2024-13-40").is_err());
    }

    #[test]
    fn apply_limit_truncates_and_rejects_zero() {
        let created = Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();
        let mut tasks: Vec<Task> = (0..3)
            .map(|idx| {
                Task::new(format!("t{idx}"), "owner", NewTask::new("x"), created).unwrap()
            })
            .collect();

        assert!(apply_limit(&mut tasks, Some(0)).is_err());
        apply_limit(&mut tasks, Some(2)).unwrap();
        assert_eq!(tasks.len(), 2);
        apply_limit(&mut tasks, None).unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn format_line_marks_overdue() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let task = Task::new(
            "01abc",
            "owner",
            NewTask::new("Pay rent")
                .with_priority(Priority::High)
                .with_due_at(now - chrono::Duration::days(1)),
            now - chrono::Duration::days(3),
        )
        .unwrap();

        assert_eq!(
            format_line(&task, now),
            "[ ][high] 01abc Pay rent (due 2024-05-09 12:00) OVERDUE"
        );
        assert_eq!(status_label(&task, now), "overdue");
    }
}
