//! Command-line interface for taskboard
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::task::TaskStore;
use crate::user::{require_user, User};

mod calendar;
mod dashboard;
mod init;
mod task;
mod user;

/// taskboard - personal task tracker
///
/// Keep a list of tasks with due dates and priorities, and see progress on
/// a dashboard and a calendar.
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding taskboard data (defaults to current directory)
    #[arg(long, global = true, env = "TASKBOARD_DIR")]
    pub dir: Option<PathBuf>,

    /// Act as this user instead of the logged-in one
    #[arg(long, global = true, env = "TASKBOARD_USER")]
    pub user: Option<String>,

    /// Password for signup, login or --user (prompted when omitted on a terminal)
    #[arg(long, global = true, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize taskboard data and config in a directory
    Init,

    /// Sign up, log in and out
    #[command(subcommand)]
    User(UserCommands),

    /// Create and manage tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Show counts, progress and recent tasks
    Dashboard {
        /// Number of recent tasks to show
        #[arg(long)]
        recent: Option<usize>,

        /// Days covered by the due-date chart
        #[arg(long)]
        window_days: Option<u32>,

        /// Days counted as "added recently"
        #[arg(long)]
        since_days: Option<u32>,
    },

    /// Show tasks as calendar events
    Calendar {
        /// Days ahead covered by the upcoming list
        #[arg(long)]
        upcoming_days: Option<u32>,
    },
}

/// User subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Register a new user and log in
    Signup {
        /// Username (letters, digits and @.+-_)
        username: String,
    },

    /// Log in as an existing user
    Login {
        /// Username
        username: String,
    },

    /// End the current session
    Logout,

    /// Show the current user
    Whoami,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    New {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Due date (RFC 3339, "YYYY-MM-DD HH:MM" or "YYYY-MM-DD", UTC)
        #[arg(long)]
        due: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// List your tasks, newest first
    List {
        /// Only completed tasks
        #[arg(long, conflicts_with = "pending")]
        completed: bool,

        /// Only pending tasks
        #[arg(long)]
        pending: bool,

        /// Only tasks created at or after this time
        #[arg(long)]
        created_since: Option<String>,

        /// Maximum number of tasks to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show task details
    Show {
        /// Task id or unique prefix
        id: String,
    },

    /// Edit task fields
    Edit {
        /// Task id or unique prefix
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(short, long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// Remove the description
        #[arg(long)]
        clear_description: bool,

        /// New due date
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,

        /// New priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// Mark a task completed
    Done {
        /// Task id or unique prefix
        id: String,
    },

    /// Mark a completed task pending again
    Reopen {
        /// Task id or unique prefix
        id: String,
    },

    /// Delete a task permanently
    Delete {
        /// Task id or unique prefix
        id: String,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => init::run(self.dir, self.json, self.quiet),
            Commands::User(cmd) => match cmd {
                UserCommands::Signup { username } => user::run_signup(user::AuthOptions {
                    username,
                    password: self.password,
                    dir: self.dir,
                    json: self.json,
                    quiet: self.quiet,
                }),
                UserCommands::Login { username } => user::run_login(user::AuthOptions {
                    username,
                    password: self.password,
                    dir: self.dir,
                    json: self.json,
                    quiet: self.quiet,
                }),
                UserCommands::Logout => user::run_logout(user::SessionOptions {
                    user: self.user,
                    password: self.password,
                    dir: self.dir,
                    json: self.json,
                    quiet: self.quiet,
                }),
                UserCommands::Whoami => user::run_whoami(user::SessionOptions {
                    user: self.user,
                    password: self.password,
                    dir: self.dir,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::New {
                    title,
                    description,
                    due,
                    priority,
                } => task::run_new(task::NewOptions {
                    title,
                    description,
                    due,
                    priority,
                    user: self.user,
                    password: self.password,
                    dir: self.dir,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::List {
                    completed,
                    pending,
                    created_since,
                    limit,
                } => task::run_list(task::ListOptions {
                    completed: status_filter(completed, pending),
                    created_since,
                    limit,
                    user: self.user,
                    password: self.password,
                    dir: self.dir,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Show { id } => task::run_show(task::ShowOptions {
                    id,
                    user: self.user,
                    password: self.password,
                    dir: self.dir,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Edit {
                    id,
                    title,
                    description,
                    clear_description,
                    due,
                    clear_due,
                    priority,
                } => task::run_edit(task::EditOptions {
                    id,
                    title,
                    description,
                    clear_description,
                    due,
                    clear_due,
                    priority,
                    user: self.user,
                    password: self.password,
                    dir: self.dir,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Done { id } => task::run_set_completed(task::CompleteOptions {
                    id,
                    completed: true,
                    user: self.user,
                    password: self.password,
                    dir: self.dir,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Reopen { id } => task::run_set_completed(task::CompleteOptions {
                    id,
                    completed: false,
                    user: self.user,
                    password: self.password,
                    dir: self.dir,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Delete { id } => task::run_delete(task::DeleteOptions {
                    id,
                    user: self.user,
                    password: self.password,
                    dir: self.dir,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Dashboard {
                recent,
                window_days,
                since_days,
            } => dashboard::run(dashboard::DashboardOptions {
                recent,
                window_days,
                since_days,
                user: self.user,
                password: self.password,
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Calendar { upcoming_days } => calendar::run(calendar::CalendarOptions {
                upcoming_days,
                user: self.user,
                password: self.password,
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}

fn status_filter(completed: bool, pending: bool) -> Option<bool> {
    match (completed, pending) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Everything an authenticated command needs.
pub(crate) struct Context {
    pub config: Config,
    pub store: TaskStore,
    pub user: User,
}

pub(crate) fn resolve_root(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(path) => Ok(path),
        None => Ok(std::env::current_dir()?),
    }
}

pub(crate) fn open_storage(dir: Option<PathBuf>) -> Result<Storage> {
    Ok(Storage::new(resolve_root(dir)?))
}

/// Resolve storage, config and the current user; fails with
/// `NotAuthenticated` when nobody is logged in.
pub(crate) fn load_context(
    dir: Option<PathBuf>,
    user: Option<String>,
    password: Option<String>,
) -> Result<Context> {
    let storage = open_storage(dir)?;
    let config = Config::load_from_root(storage.root());
    let user = require_user(&storage, user.as_deref(), password.as_deref())?;
    tracing::debug!(username = %user.username, root = %storage.root().display(), "context loaded");
    Ok(Context {
        config,
        store: TaskStore::new(storage),
        user,
    })
}

/// Command-line overrides reuse config validation; report them as bad
/// arguments rather than a bad config file.
pub(crate) fn as_argument_error(err: Error) -> Error {
    match err {
        Error::InvalidConfig(message) => Error::InvalidArgument(message),
        other => other,
    }
}
