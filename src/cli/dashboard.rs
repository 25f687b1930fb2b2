//! taskboard dashboard command implementation.

use std::path::PathBuf;

use chrono::Utc;

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::metrics::{DailyCount, DashboardMetrics};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::TaskRepository;

use super::task::format_line;
use super::{as_argument_error, load_context};

pub struct DashboardOptions {
    pub recent: Option<usize>,
    pub window_days: Option<u32>,
    pub since_days: Option<u32>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

const BAR_WIDTH: usize = 20;

pub fn run(options: DashboardOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.user, options.password)?;
    let settings = DashboardConfig {
        recent_limit: options.recent.unwrap_or(ctx.config.dashboard.recent_limit),
        window_days: options.window_days.unwrap_or(ctx.config.dashboard.window_days),
        created_since_days: options
            .since_days
            .unwrap_or(ctx.config.dashboard.created_since_days),
    };
    settings.validate().map_err(as_argument_error)?;

    let tasks = ctx.store.find_by_owner(&ctx.user.id)?;
    let now = Utc::now();
    let metrics = DashboardMetrics::compute(&tasks, now, &settings);

    let mut human = HumanOutput::new(format!("Dashboard for {}", ctx.user.username));
    human.push_summary("Total", metrics.summary.total.to_string());
    human.push_summary("Completed", metrics.summary.completed.to_string());
    human.push_summary("Pending", metrics.summary.pending.to_string());
    human.push_summary("Overdue", metrics.summary.overdue.to_string());
    human.push_summary("Progress", format!("{:.2}%", metrics.progress_percentage));
    human.push_summary(
        format!("Added in last {} days", metrics.created_window_days),
        metrics.created_recently.to_string(),
    );
    for task in &metrics.recent_tasks {
        human.push_detail(format_line(task, now));
    }
    for day in &metrics.daily_counts {
        human.push_detail(format_day(day));
    }
    if metrics.summary.overdue > 0 {
        human.push_warning(format!("{} task(s) overdue", metrics.summary.overdue));
    }
    if metrics.summary.total == 0 {
        human.push_next_step("taskboard task new <title>");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "dashboard",
        &metrics,
        Some(&human),
    )
}

fn format_day(day: &DailyCount) -> String {
    let filled = day.percentage as usize * BAR_WIDTH / 100;
    format!(
        "{} {:<width$} {}",
        day.date.format("%a %m-%d"),
        "#".repeat(filled),
        day.count,
        width = BAR_WIDTH
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn day_bar_scales_with_percentage() {
        let day = DailyCount {
            date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            count: 2,
            percentage: 40,
        };
        assert_eq!(format_day(&day), format!("Fri 05-10 {:<20} 2", "########"));
    }
}
