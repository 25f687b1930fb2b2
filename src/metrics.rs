//! Derived dashboard metrics.
//!
//! Everything here is a pure function of one user's task collection and a
//! reference `now`. Nothing is cached or persisted, and an empty collection
//! yields zero-valued results rather than errors.

use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::task::{is_overdue, sort_newest_first, Task};

/// Chart intensity added per task due on a given day.
pub const INTENSITY_PER_TASK: u32 = 20;

const MAX_INTENSITY: u32 = 100;

/// Longest window `daily_counts` produces; larger requests are clamped.
pub const MAX_WINDOW_DAYS: u32 = 366;

pub fn total_count(tasks: &[Task]) -> usize {
    tasks.len()
}

pub fn completed_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| task.completed).count()
}

pub fn pending_count(tasks: &[Task]) -> usize {
    total_count(tasks).saturating_sub(completed_count(tasks))
}

/// Share of completed tasks in `[0, 100]`, rounded to two decimals.
pub fn progress_percentage(tasks: &[Task]) -> f64 {
    let total = total_count(tasks);
    if total == 0 {
        return 0.0;
    }
    round2(completed_count(tasks) as f64 / total as f64 * 100.0)
}

pub fn created_since(tasks: &[Task], since: DateTime<Utc>) -> usize {
    tasks.iter().filter(|task| task.created_at >= since).count()
}

pub fn overdue_count(tasks: &[Task], now: DateTime<Utc>) -> usize {
    tasks.iter().filter(|task| is_overdue(task, now)).count()
}

/// The `limit` most recently created tasks, newest first.
pub fn recent_tasks(tasks: &[Task], limit: usize) -> Vec<Task> {
    let mut recent = tasks.to_vec();
    sort_newest_first(&mut recent);
    recent.truncate(limit);
    recent
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
    pub percentage: u32,
}

/// Tasks due on each of the last `window_days` UTC dates, oldest first and
/// ending today. The window is clamped to [`MAX_WINDOW_DAYS`] and never
/// reaches before the earliest representable date.
pub fn daily_counts(tasks: &[Task], now: DateTime<Utc>, window_days: u32) -> Vec<DailyCount> {
    let today = now.date_naive();
    (0..window_days.min(MAX_WINDOW_DAYS))
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
        .map(|date| {
            let count = tasks
                .iter()
                .filter(|task| task.due_at.map(|due| due.date_naive()) == Some(date))
                .count();
            DailyCount {
                date,
                count,
                percentage: intensity(count),
            }
        })
        .collect()
}

// Not normalized against the busiest day: five tasks already saturate.
fn intensity(count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    let scaled = (count as u64).saturating_mul(u64::from(INTENSITY_PER_TASK));
    scaled.min(u64::from(MAX_INTENSITY)) as u32
}

/// Headline counts shared by the dashboard and calendar views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
}

impl TaskSummary {
    pub fn from_tasks(tasks: &[Task], now: DateTime<Utc>) -> Self {
        Self {
            total: total_count(tasks),
            completed: completed_count(tasks),
            pending: pending_count(tasks),
            overdue: overdue_count(tasks, now),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: TaskSummary,
    pub progress_percentage: f64,
    pub created_window_days: u32,
    pub created_recently: usize,
    pub recent_tasks: Vec<Task>,
    pub daily_counts: Vec<DailyCount>,
}

impl DashboardMetrics {
    pub fn compute(tasks: &[Task], now: DateTime<Utc>, settings: &DashboardConfig) -> Self {
        let since = days_before(now, settings.created_since_days);
        Self {
            generated_at: now,
            summary: TaskSummary::from_tasks(tasks, now),
            progress_percentage: progress_percentage(tasks),
            created_window_days: settings.created_since_days,
            created_recently: created_since(tasks, since),
            recent_tasks: recent_tasks(tasks, settings.recent_limit),
            daily_counts: daily_counts(tasks, now, settings.window_days),
        }
    }
}

/// `now` minus `days`, saturating at the earliest representable instant.
pub fn days_before(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
