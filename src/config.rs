//! Configuration loading and management
//!
//! Handles parsing of `.taskboard.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::storage::CONFIG_FILE;

const MAX_WINDOW_DAYS: u32 = 366;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Dashboard configuration
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Calendar configuration
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Number of tasks in the "recent" list
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Days covered by the daily due-date chart, today included
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Lookback for the "added this week" counter
    #[serde(default = "default_created_since_days")]
    pub created_since_days: u32,
}

fn default_recent_limit() -> usize {
    5
}

fn default_window_days() -> u32 {
    7
}

fn default_created_since_days() -> u32 {
    7
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            window_days: default_window_days(),
            created_since_days: default_created_since_days(),
        }
    }
}

/// Calendar configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Days ahead covered by the upcoming list
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: u32,
}

fn default_upcoming_days() -> u32 {
    7
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            upcoming_days: default_upcoming_days(),
        }
    }
}

impl Config {
    /// Load configuration from a `.taskboard.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data root, or return defaults
    pub fn load_from_root(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Save configuration to a file, replacing it atomically.
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        crate::lock::write_atomic(path, content.as_bytes())
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.dashboard.validate()?;
        self.calendar.validate()?;
        Ok(())
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.recent_limit == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "dashboard.recent_limit must be >= 1".to_string(),
            ));
        }
        validate_days(self.window_days, "dashboard.window_days")?;
        validate_days(self.created_since_days, "dashboard.created_since_days")
    }
}

impl CalendarConfig {
    pub fn validate(&self) -> crate::error::Result<()> {
        validate_days(self.upcoming_days, "calendar.upcoming_days")
    }
}

fn validate_days(days: u32, field: &str) -> crate::error::Result<()> {
    if days == 0 || days > MAX_WINDOW_DAYS {
        return Err(crate::error::Error::InvalidConfig(format!(
            "{field} must be between 1 and {MAX_WINDOW_DAYS}"
        )));
    }
    Ok(())
}
