//! taskboard user command implementations.
//!
//! Signup, login, logout and whoami over the local user registry.

use std::io::IsTerminal;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::user::{current_user, User, UserStore};

/// Options for `user signup` and `user login`
pub struct AuthOptions {
    pub username: String,
    pub password: Option<String>,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// Options for `user logout` and `user whoami`
pub struct SessionOptions {
    pub user: Option<String>,
    pub password: Option<String>,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct UserReport {
    id: String,
    username: String,
    created_at: DateTime<Utc>,
}

impl From<User> for UserReport {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

#[derive(serde::Serialize)]
struct LogoutReport {
    logged_out: Option<String>,
}

#[derive(serde::Serialize)]
struct WhoamiReport {
    user: Option<UserReport>,
}

pub fn run_signup(options: AuthOptions) -> Result<()> {
    let storage = super::open_storage(options.dir)?;
    let password = require_password(options.password, "Choose a password: ")?;
    let user = UserStore::new(storage).signup(&options.username, &password)?;

    let mut human = HumanOutput::new(format!("Signed up as {}", user.username));
    human.push_summary("ID", user.id.clone());
    human.push_next_step("taskboard task new <title>");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "user signup",
        &UserReport::from(user),
        Some(&human),
    )
}

pub fn run_login(options: AuthOptions) -> Result<()> {
    let storage = super::open_storage(options.dir)?;
    let password = require_password(options.password, "Password: ")?;
    let user = UserStore::new(storage).login(&options.username, &password)?;

    let mut human = HumanOutput::new(format!("Logged in as {}", user.username));
    human.push_summary("ID", user.id.clone());
    human.push_next_step("taskboard dashboard");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "user login",
        &UserReport::from(user),
        Some(&human),
    )
}

pub fn run_logout(options: SessionOptions) -> Result<()> {
    let storage = super::open_storage(options.dir)?;
    let previous = UserStore::new(storage).logout()?;

    let mut human = match previous.as_deref() {
        Some(username) => HumanOutput::new(format!("Logged out {username}")),
        None => HumanOutput::new("Not logged in"),
    };
    if options.user.is_some() {
        human.push_warning("--user/TASKBOARD_USER still selects a user for later commands");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "user logout",
        &LogoutReport {
            logged_out: previous,
        },
        Some(&human),
    )
}

pub fn run_whoami(options: SessionOptions) -> Result<()> {
    let storage = super::open_storage(options.dir)?;
    let user = current_user(
        &storage,
        options.user.as_deref(),
        options.password.as_deref(),
    )?;

    let human = match user.as_ref() {
        Some(user) => {
            let mut human = HumanOutput::new(user.username.clone());
            human.push_summary("ID", user.id.clone());
            human.push_summary("Joined", user.created_at.to_rfc3339());
            human
        }
        None => {
            let mut human = HumanOutput::new("Not logged in");
            human.push_next_step("taskboard user login <name> --password <password>");
            human
        }
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "user whoami",
        &WhoamiReport {
            user: user.map(UserReport::from),
        },
        Some(&human),
    )
}

/// Password from `--password`/`TASKBOARD_PASSWORD`, else a hidden prompt
/// when stdin is a terminal.
fn require_password(password: Option<String>, prompt: &str) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    if !std::io::stdin().is_terminal() {
        return Err(Error::InvalidArgument(
            "password required: pass --password or set TASKBOARD_PASSWORD".to_string(),
        ));
    }
    Ok(rpassword::prompt_password(prompt)?)
}
