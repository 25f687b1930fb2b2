//! taskboard calendar command implementation.

use std::path::PathBuf;

use chrono::Utc;

use crate::calendar::{CalendarEvent, CalendarView};
use crate::config::CalendarConfig;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::TaskRepository;

use super::task::{format_line, format_when};
use super::{as_argument_error, load_context};

pub struct CalendarOptions {
    pub upcoming_days: Option<u32>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run(options: CalendarOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.user, options.password)?;
    let settings = CalendarConfig {
        upcoming_days: options
            .upcoming_days
            .unwrap_or(ctx.config.calendar.upcoming_days),
    };
    settings.validate().map_err(as_argument_error)?;

    let tasks = ctx.store.find_by_owner(&ctx.user.id)?;
    let now = Utc::now();
    let view = CalendarView::build(&tasks, now, settings.upcoming_days);

    let mut dated: Vec<&CalendarEvent> = view.dated_events().collect();
    dated.sort_by(|left, right| {
        left.start
            .cmp(&right.start)
            .then_with(|| left.id.cmp(&right.id))
    });

    let mut human = HumanOutput::new(format!("Calendar for {}", ctx.user.username));
    human.push_summary("Total", view.summary.total.to_string());
    human.push_summary("Completed", view.summary.completed.to_string());
    human.push_summary("Pending", view.summary.pending.to_string());
    human.push_summary("Overdue", view.summary.overdue.to_string());
    human.push_summary(
        format!("Due in next {} days", view.upcoming_days),
        view.upcoming.len().to_string(),
    );
    for event in dated {
        human.push_detail(format_event(event));
    }
    for task in &view.upcoming {
        human.push_detail(format!("upcoming: {}", format_line(task, now)));
    }
    let undated = view.events.len() - view.dated_events().count();
    if undated > 0 {
        human.push_detail(format!("{undated} task(s) without a due date"));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "calendar",
        &view,
        Some(&human),
    )
}

fn format_event(event: &CalendarEvent) -> String {
    let start = event
        .start
        .map(format_when)
        .unwrap_or_else(|| "unscheduled".to_string());
    format!("{start} [{}] {} {}", event.color.as_str(), event.id, event.title)
}
