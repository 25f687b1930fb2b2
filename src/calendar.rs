//! Calendar projection: tasks as colour-coded, time-anchored events.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::metrics::TaskSummary;
use crate::task::{is_overdue, Priority, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    Green,
    Red,
    Amber,
    Blue,
}

impl EventColor {
    /// Pick the colour for `task`; the first matching rule wins.
    ///
    /// 1. completed -> green
    /// 2. overdue -> red
    /// 3. high priority -> red
    /// 4. medium priority -> amber
    /// 5. low priority -> blue
    pub fn for_task(task: &Task, now: DateTime<Utc>) -> Self {
        if task.completed {
            return EventColor::Green;
        }
        if is_overdue(task, now) {
            return EventColor::Red;
        }
        match task.priority {
            Priority::High => EventColor::Red,
            Priority::Medium => EventColor::Amber,
            Priority::Low => EventColor::Blue,
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            EventColor::Green => "#10b981",
            EventColor::Red => "#ef4444",
            EventColor::Amber => "#f59e0b",
            EventColor::Blue => "#3b82f6",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventColor::Green => "green",
            EventColor::Red => "red",
            EventColor::Amber => "amber",
            EventColor::Blue => "blue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventProperties {
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    /// Absent for tasks without a due date; those only render in list form.
    pub start: Option<DateTime<Utc>>,
    pub color: EventColor,
    pub color_hex: &'static str,
    pub properties: EventProperties,
}

impl CalendarEvent {
    pub fn from_task(task: &Task, now: DateTime<Utc>) -> Self {
        let color = EventColor::for_task(task, now);
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            start: task.due_at,
            color,
            color_hex: color.hex(),
            properties: EventProperties {
                description: task.description.clone(),
                priority: task.priority,
                completed: task.completed,
                is_overdue: is_overdue(task, now),
                created_at: task.created_at,
            },
        }
    }

    pub fn is_dated(&self) -> bool {
        self.start.is_some()
    }
}

/// One event per task, in input order.
pub fn project_events(tasks: &[Task], now: DateTime<Utc>) -> Vec<CalendarEvent> {
    tasks
        .iter()
        .map(|task| CalendarEvent::from_task(task, now))
        .collect()
}

/// Tasks due within `[now, now + days]`, soonest first. The end of the
/// window saturates at the latest representable instant.
pub fn upcoming_window(tasks: &[Task], now: DateTime<Utc>, days: u32) -> Vec<Task> {
    let end = now
        .checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let mut upcoming: Vec<Task> = tasks
        .iter()
        .filter(|task| {
            task.due_at
                .map(|due| due >= now && due <= end)
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    upcoming.sort_by(|left, right| {
        left.due_at
            .cmp(&right.due_at)
            .then_with(|| left.id.cmp(&right.id))
    });
    upcoming
}

/// Everything the calendar page renders.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarView {
    pub generated_at: DateTime<Utc>,
    pub upcoming_days: u32,
    #[serde(flatten)]
    pub summary: TaskSummary,
    pub events: Vec<CalendarEvent>,
    pub upcoming: Vec<Task>,
}

impl CalendarView {
    pub fn build(tasks: &[Task], now: DateTime<Utc>, upcoming_days: u32) -> Self {
        Self {
            generated_at: now,
            upcoming_days,
            summary: TaskSummary::from_tasks(tasks, now),
            events: project_events(tasks, now),
            upcoming: upcoming_window(tasks, now, upcoming_days),
        }
    }

    /// Events with a start time, i.e. the ones a date grid can place.
    pub fn dated_events(&self) -> impl Iterator<Item = &CalendarEvent> {
        self.events.iter().filter(|event| event.is_dated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::NewTask;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn task(id: &str, priority: Priority, due_at: Option<DateTime<Utc>>, completed: bool) -> Task {
        let mut task = Task::new(
            id,
            "owner-1",
            NewTask::new(format!("Task {id}")).with_priority(priority),
            now() - Duration::days(3),
        )
        .expect("task");
        task.due_at = due_at;
        task.completed = completed;
        task
    }

    #[test]
    fn completed_wins_over_overdue_and_priority() {
        let task = task("a", Priority::High, Some(now() - Duration::days(1)), true);
        assert_eq!(EventColor::for_task(&task, now()), EventColor::Green);
    }

    #[test]
    fn overdue_low_priority_is_red() {
        let task = task("a", Priority::Low, Some(now() - Duration::hours(1)), false);
        assert_eq!(EventColor::for_task(&task, now()), EventColor::Red);
    }

    #[test]
    fn pending_colours_follow_priority() {
        let later = Some(now() + Duration::days(1));
        assert_eq!(
            EventColor::for_task(&task("h", Priority::High, later, false), now()),
            EventColor::Red
        );
        assert_eq!(
            EventColor::for_task(&task("m", Priority::Medium, later, false), now()),
            EventColor::Amber
        );
        assert_eq!(
            EventColor::for_task(&task("l", Priority::Low, None, false), now()),
            EventColor::Blue
        );
    }

    #[test]
    fn event_carries_properties_and_optional_start() {
        let undated = task("u", Priority::Medium, None, false);
        let event = CalendarEvent::from_task(&undated, now());
        assert!(!event.is_dated());
        assert!(!event.properties.is_overdue);
        assert_eq!(event.color, EventColor::Amber);
        assert_eq!(event.color_hex, "#f59e0b");
        assert_eq!(event.properties.created_at, undated.created_at);

        let late = task("l", Priority::Low, Some(now() - Duration::days(1)), false);
        let event = CalendarEvent::from_task(&late, now());
        assert_eq!(event.start, late.due_at);
        assert!(event.properties.is_overdue);

        let json = serde_json::to_value(&event).expect("json");
        assert_eq!(json["color"].as_str(), Some("red"));
        assert_eq!(json["properties"]["priority"].as_str(), Some("low"));
    }

    #[test]
    fn upcoming_window_is_inclusive_and_sorted() {
        let tasks = vec![
            task("past", Priority::Low, Some(now() - Duration::seconds(1)), false),
            task("edge-end", Priority::Low, Some(now() + Duration::days(7)), false),
            task("soon", Priority::Low, Some(now() + Duration::hours(1)), false),
            task("edge-start", Priority::Low, Some(now()), true),
            task("far", Priority::Low, Some(now() + Duration::days(8)), false),
            task("none", Priority::Low, None, false),
        ];

        let upcoming = upcoming_window(&tasks, now(), 7);
        let ids: Vec<&str> = upcoming.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, vec!["edge-start", "soon", "edge-end"]);
    }

    #[test]
    fn upcoming_window_accepts_any_day_count() {
        let tasks = vec![
            task("soon", Priority::Low, Some(now() + Duration::days(1)), false),
            task("far", Priority::Low, Some(now() + Duration::days(365 * 500)), false),
        ];

        let upcoming = upcoming_window(&tasks, now(), u32::MAX);
        assert_eq!(upcoming.len(), 2);
        assert!(upcoming_window(&[], DateTime::<Utc>::MAX_UTC, u32::MAX).is_empty());
    }

    #[test]
    fn view_summarizes_and_keeps_undated_events() {
        let tasks = vec![
            task("done", Priority::High, Some(now() - Duration::days(1)), true),
            task("late", Priority::Medium, Some(now() - Duration::days(1)), false),
            task("free", Priority::Low, None, false),
        ];

        let view = CalendarView::build(&tasks, now(), 7);
        assert_eq!(view.summary.total, 3);
        assert_eq!(view.summary.completed, 1);
        assert_eq!(view.summary.pending, 2);
        assert_eq!(view.summary.overdue, 1);
        assert_eq!(view.events.len(), 3);
        assert_eq!(view.dated_events().count(), 2);
        assert!(view.upcoming.is_empty());
    }
}
