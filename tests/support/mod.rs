#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Password every helper-created user signs up with.
pub const PASSWORD: &str = "correct-horse-1";

pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join(".taskboard")
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(".taskboard.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }
}

/// Binary command rooted at `dir`, isolated from the caller's environment.
pub fn taskboard_cmd(dir: &TestDir) -> Command {
    let mut cmd = Command::cargo_bin("taskboard").expect("binary");
    cmd.current_dir(dir.path())
        .env_remove("TASKBOARD_USER")
        .env_remove("TASKBOARD_DIR")
        .env_remove("TASKBOARD_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Run with `--json`, assert success and return the envelope.
pub fn run_json(dir: &TestDir, args: &[&str]) -> Value {
    let output = taskboard_cmd(dir)
        .arg("--json")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("json envelope")
}

/// Run with `--json`, assert the exit code and return the error envelope.
pub fn run_json_error(dir: &TestDir, args: &[&str], code: i32) -> Value {
    let output = taskboard_cmd(dir)
        .arg("--json")
        .args(args)
        .assert()
        .code(code)
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("json error envelope")
}

/// Sign up (and thereby log in) `username`; returns the user id.
pub fn signup(dir: &TestDir, username: &str) -> String {
    let value = run_json(dir, &["user", "signup", username, "--password", PASSWORD]);
    value["data"]["id"].as_str().expect("user id").to_string()
}

/// Create a task for the logged-in user; returns its id.
pub fn new_task(dir: &TestDir, args: &[&str]) -> String {
    let mut full = vec!["task", "new"];
    full.extend_from_slice(args);
    let value = run_json(dir, &full);
    value["data"]["id"].as_str().expect("task id").to_string()
}
