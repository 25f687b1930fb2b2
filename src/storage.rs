//! Storage layer for taskboard
//!
//! All state lives under a single data root:
//!
//! ```text
//! <root>/
//!   .taskboard.toml             # Configuration (optional)
//!   .taskboard/
//!     tasks.json                # Task snapshot for every user
//!     users.json                # Registered users
//!     session                   # Username of the logged-in user
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// Name of the data directory inside the root
pub const DATA_DIR: &str = ".taskboard";

/// Name of the configuration file inside the root
pub const CONFIG_FILE: &str = ".taskboard.toml";

/// Storage manager for taskboard state
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the `.taskboard/` directory
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.data_dir().join("tasks.json")
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir().join("users.json")
    }

    pub fn session_file(&self) -> PathBuf {
        self.data_dir().join("session")
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Create the data directory; returns `true` if it did not exist yet.
    pub fn init(&self) -> Result<bool> {
        let dir = self.data_dir();
        let created = !dir.exists();
        fs::create_dir_all(&dir)?;
        Ok(created)
    }

    pub fn is_initialized(&self) -> bool {
        self.data_dir().exists()
    }

    // =========================================================================
    // File I/O helpers
    // =========================================================================

    /// Write JSON data atomically (write to temp, then rename)
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::write_atomic(path, json.as_bytes())
    }

    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(data)
    }

    /// Read JSON, or the type's default when the file does not exist yet.
    pub fn read_json_or_default<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T> {
        if !path.exists() {
            return Ok(T::default());
        }
        self.read_json(path)
    }

    /// Locked read-modify-write of a JSON document.
    ///
    /// The closure's changes are persisted only when it returns `Ok`.
    pub fn update_json<T, R, F>(&self, path: &Path, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T) -> Result<R>,
    {
        let _lock = FileLock::acquire(lock::lock_path_for(path), DEFAULT_LOCK_TIMEOUT_MS)?;

        let mut document: T = self.read_json_or_default(path)?;
        let result = f(&mut document)?;
        self.write_json(path, &document)?;

        Ok(result)
    }

    /// Read a small text file, trimmed; `None` when missing or blank.
    pub fn read_text(&self, path: &Path) -> Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(Some(trimmed.to_string()))
    }

    pub fn write_text(&self, path: &Path, value: &str) -> Result<()> {
        lock::write_atomic(path, format!("{value}\n").as_bytes())
    }

    /// Remove a file; returns `false` if it was already gone.
    pub fn remove_file(&self, path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
    }

    #[test]
    fn paths_live_under_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();
        let storage = Storage::new(root.clone());

        assert_eq!(storage.data_dir(), root.join(".taskboard"));
        assert_eq!(storage.config_file(), root.join(".taskboard.toml"));
        assert_eq!(storage.tasks_file(), root.join(".taskboard/tasks.json"));
        assert_eq!(storage.users_file(), root.join(".taskboard/users.json"));
        assert_eq!(storage.session_file(), root.join(".taskboard/session"));
    }

    #[test]
    fn init_reports_first_creation() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());

        assert!(!storage.is_initialized());
        assert!(storage.init().unwrap());
        assert!(storage.is_initialized());
        assert!(!storage.init().unwrap());
    }

    #[test]
    fn update_json_persists_on_success_only() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());
        let path = storage.data_dir().join("counter.json");

        let next = storage
            .update_json(&path, |counter: &mut Counter| {
                counter.value += 1;
                Ok(counter.value)
            })
            .unwrap();
        assert_eq!(next, 1);

        let failed: Result<()> = storage.update_json(&path, |counter: &mut Counter| {
            counter.value = 99;
            Err(Error::InvalidArgument("nope".to_string()))
        });
        assert!(failed.is_err());

        let stored: Counter = storage.read_json(&path).unwrap();
        assert_eq!(stored, Counter { value: 1 });
    }

    #[test]
    fn text_round_trip_and_remove() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());
        let path = storage.session_file();

        assert_eq!(storage.read_text(&path).unwrap(), None);
        storage.write_text(&path, "alice").unwrap();
        assert_eq!(storage.read_text(&path).unwrap().as_deref(), Some("alice"));

        assert!(storage.remove_file(&path).unwrap());
        assert!(!storage.remove_file(&path).unwrap());
    }
}
