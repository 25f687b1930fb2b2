//! Task entity and the task record store.
//!
//! Tasks for every user live in one snapshot file, `.taskboard/tasks.json`.
//! All access goes through [`TaskRepository`], which takes the owner id
//! explicitly; a task owned by someone else is indistinguishable from a
//! missing one.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{Error, Result};
use crate::storage::Storage;

const TASKS_SCHEMA_VERSION: &str = "taskboard.tasks.v1";

/// Maximum title length, in characters.
pub const TITLE_MAX_LEN: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("priority cannot be empty".to_string()));
        }
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown priority '{trimmed}' (expected low, medium or high)"
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    pub owner_id: String,
}

impl Task {
    /// Build a task from creation input, applying defaults and validation.
    ///
    /// New tasks are never completed and default to [`Priority::Medium`].
    pub fn new(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        input: NewTask,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let owner_id = owner_id.into();
        if owner_id.trim().is_empty() {
            return Err(Error::InvalidArgument("owner id cannot be empty".to_string()));
        }
        Ok(Self {
            id: id.into(),
            title: normalize_title(&input.title)?,
            description: normalize_description(input.description),
            created_at,
            due_at: input.due_at,
            priority: input.priority.unwrap_or_default(),
            completed: false,
            owner_id,
        })
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        is_overdue(self, now)
    }
}

/// Due, not completed, and the due time is strictly before `now`.
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    match task.due_at {
        Some(due_at) => !task.completed && due_at < now,
        None => false,
    }
}

/// Newest first: `created_at` descending, then `id` descending.
pub fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|left, right| {
        right
            .created_at
            .cmp(&left.created_at)
            .then_with(|| right.id.cmp(&left.id))
    });
}

/// Input for creating a task. Only the title is required.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Partial update of the mutable task fields.
///
/// `description` and `due_at` use a nested option: `Some(None)` clears the
/// field, `None` leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_at: Option<Option<DateTime<Utc>>>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

impl TaskUpdate {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_at.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
    }

    /// Apply to `task`. Validation happens before any field changes.
    pub fn apply(self, task: &mut Task) -> Result<()> {
        let title = self.title.as_deref().map(normalize_title).transpose()?;

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = normalize_description(description);
        }
        if let Some(due_at) = self.due_at {
            task.due_at = due_at;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        Ok(())
    }
}

fn normalize_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("title cannot be empty".to_string()));
    }
    if trimmed.chars().count() > TITLE_MAX_LEN {
        return Err(Error::InvalidArgument(format!(
            "title cannot exceed {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Query and mutation contract for task records.
///
/// Every call is scoped to one owner. Collections come back newest first.
pub trait TaskRepository {
    fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Task>>;

    fn find_by_owner_completed(&self, owner_id: &str, completed: bool) -> Result<Vec<Task>> {
        let mut tasks = self.find_by_owner(owner_id)?;
        tasks.retain(|task| task.completed == completed);
        Ok(tasks)
    }

    /// Tasks created at or after `since`.
    fn find_by_owner_created_after(
        &self,
        owner_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Task>> {
        let mut tasks = self.find_by_owner(owner_id)?;
        tasks.retain(|task| task.created_at >= since);
        Ok(tasks)
    }

    fn get(&self, id: &str, owner_id: &str) -> Result<Task> {
        self.find_by_owner(owner_id)?
            .into_iter()
            .find(|task| task.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }

    fn create(&self, owner_id: &str, input: NewTask) -> Result<Task>;

    fn update(&self, id: &str, owner_id: &str, update: TaskUpdate) -> Result<Task>;

    fn delete(&self, id: &str, owner_id: &str) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub schema_version: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Default for TaskSnapshot {
    fn default() -> Self {
        Self {
            schema_version: TASKS_SCHEMA_VERSION.to_string(),
            tasks: Vec::new(),
        }
    }
}

/// File-backed [`TaskRepository`].
#[derive(Debug, Clone)]
pub struct TaskStore {
    storage: Storage,
}

impl TaskStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    fn snapshot(&self) -> Result<TaskSnapshot> {
        self.storage
            .read_json_or_default(&self.storage.tasks_file())
    }

    /// Resolve a full id or a unique case-insensitive prefix among the
    /// owner's tasks.
    pub fn resolve_task_id(&self, owner_id: &str, input: &str) -> Result<String> {
        let needle = input.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
        }

        let tasks = self.find_by_owner(owner_id)?;
        if let Some(task) = tasks.iter().find(|task| task.id == needle) {
            return Ok(task.id.clone());
        }

        let mut matches: Vec<String> = tasks
            .into_iter()
            .filter(|task| task.id.starts_with(&needle))
            .map(|task| task.id)
            .collect();
        matches.sort();

        match matches.len() {
            0 => Err(Error::TaskNotFound(input.trim().to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(Error::InvalidArgument(format!(
                "ambiguous task id '{}': {}",
                input.trim(),
                matches.join(", ")
            ))),
        }
    }
}

impl TaskRepository for TaskStore {
    fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Task>> {
        let snapshot = self.snapshot()?;
        let mut tasks: Vec<Task> = snapshot
            .tasks
            .into_iter()
            .filter(|task| task.owner_id == owner_id)
            .collect();
        sort_newest_first(&mut tasks);
        tracing::debug!(owner_id, count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    fn create(&self, owner_id: &str, input: NewTask) -> Result<Task> {
        let path = self.storage.tasks_file();
        let task = self.storage.update_json(&path, |snapshot: &mut TaskSnapshot| {
            let mut id = new_task_id();
            while snapshot.tasks.iter().any(|task| task.id == id) {
                id = new_task_id();
            }
            let task = Task::new(id, owner_id, input, Utc::now())?;
            snapshot.tasks.push(task.clone());
            Ok(task)
        })?;
        tracing::info!(task_id = %task.id, owner_id, "task created");
        Ok(task)
    }

    fn update(&self, id: &str, owner_id: &str, update: TaskUpdate) -> Result<Task> {
        let path = self.storage.tasks_file();
        let task = self.storage.update_json(&path, |snapshot: &mut TaskSnapshot| {
            let task = snapshot
                .tasks
                .iter_mut()
                .find(|task| task.id == id && task.owner_id == owner_id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
            update.apply(task)?;
            Ok(task.clone())
        })?;
        tracing::info!(task_id = %task.id, owner_id, "task updated");
        Ok(task)
    }

    fn delete(&self, id: &str, owner_id: &str) -> Result<()> {
        let path = self.storage.tasks_file();
        self.storage.update_json(&path, |snapshot: &mut TaskSnapshot| {
            let before = snapshot.tasks.len();
            snapshot
                .tasks
                .retain(|task| !(task.id == id && task.owner_id == owner_id));
            if snapshot.tasks.len() == before {
                return Err(Error::TaskNotFound(id.to_string()));
            }
            Ok(())
        })?;
        tracing::info!(task_id = id, owner_id, "task deleted");
        Ok(())
    }
}

fn new_task_id() -> String {
    Ulid::new().to_string().to_ascii_lowercase()
}
