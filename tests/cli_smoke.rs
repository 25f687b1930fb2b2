mod support;

use assert_cmd::Command;
use predicates::str::contains;

use support::{run_json, taskboard_cmd, TestDir};

#[test]
fn taskboard_help_works() {
    Command::cargo_bin("taskboard")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("personal task tracker"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = [
        vec!["init"],
        vec!["user"],
        vec!["user", "signup"],
        vec!["task"],
        vec!["task", "new"],
        vec!["task", "edit"],
        vec!["dashboard"],
        vec!["calendar"],
    ];

    for cmd in subcommands {
        Command::cargo_bin("taskboard")
            .expect("binary")
            .args(&cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn init_creates_data_dir_and_config() {
    let dir = TestDir::new();

    let value = run_json(&dir, &["init"]);
    assert_eq!(value["schema_version"], "taskboard.v1");
    assert_eq!(value["command"], "init");
    assert_eq!(value["status"], "success");
    assert_eq!(value["data"]["created"]["config"], true);
    assert_eq!(value["data"]["created"]["data_dir"], true);
    assert!(dir.data_dir().is_dir());

    let config = std::fs::read_to_string(dir.path().join(".taskboard.toml")).expect("config");
    assert!(config.contains("[dashboard]"));
    assert!(config.contains("recent_limit = 5"));
    assert!(config.contains("[calendar]"));
}

#[test]
fn init_is_idempotent_and_keeps_config() {
    let dir = TestDir::new();
    dir.write_config("[dashboard]\nrecent_limit = 3\n")
        .expect("config");

    taskboard_cmd(&dir).arg("init").assert().success();
    taskboard_cmd(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("nothing to do"));

    let config = std::fs::read_to_string(dir.path().join(".taskboard.toml")).expect("config");
    assert_eq!(config, "[dashboard]\nrecent_limit = 3\n");
}

#[test]
fn dir_flag_selects_data_root() {
    let dir = TestDir::new();
    let other = TestDir::new();

    taskboard_cmd(&dir)
        .arg("--dir")
        .arg(other.path())
        .args(["user", "signup", "alice", "--password", support::PASSWORD])
        .assert()
        .success();

    assert!(other.data_dir().join("users.json").is_file());
    assert!(!dir.data_dir().exists());
}

#[test]
fn quiet_suppresses_human_output() {
    let dir = TestDir::new();
    taskboard_cmd(&dir)
        .args(["-q", "init"])
        .assert()
        .success()
        .stdout("");
}
