//! taskboard - personal task tracker library
//!
//! Users keep a list of tasks (title, description, due date, priority,
//! completion state). Everything the dashboard and calendar show is derived
//! from that list at read time.
//!
//! # Core Concepts
//!
//! - **Tasks**: owner-scoped records behind the `TaskRepository` trait
//! - **Metrics**: pure counts, progress and per-day due intensity
//! - **Calendar**: colour-coded events and the upcoming window
//! - **Users**: local registry with Argon2id password hashes and a login session
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.taskboard.toml`
//! - `error`: Error types and result aliases
//! - `task`: Task entity, validation and the file-backed store
//! - `metrics`: Dashboard metrics
//! - `calendar`: Calendar projection
//! - `user`: User registry and current-user resolution
//! - `storage`: File storage and directory management
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON rendering of command results

pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod metrics;
pub mod output;
pub mod storage;
pub mod task;
pub mod user;

pub use error::{Error, Result};
