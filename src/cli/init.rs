//! taskboard init command implementation
//!
//! Creates the data directory and a default `.taskboard.toml`.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::{Storage, CONFIG_FILE, DATA_DIR};

#[derive(serde::Serialize)]
struct InitReport {
    root: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    data_dir: bool,
}

pub fn run(dir: Option<PathBuf>, json: bool, quiet: bool) -> Result<()> {
    let storage = super::open_storage(dir)?;
    let created_data_dir = storage.init()?;
    let created_config = ensure_config(&storage)?;
    tracing::info!(
        root = %storage.root().display(),
        created_data_dir,
        created_config,
        "initialized"
    );

    let report = InitReport {
        root: storage.root().to_path_buf(),
        created: InitCreated {
            config: created_config,
            data_dir: created_data_dir,
        },
    };

    let mut created_items = Vec::new();
    if created_config {
        created_items.push(CONFIG_FILE.to_string());
    }
    if created_data_dir {
        created_items.push(format!("{DATA_DIR}/"));
    }

    let header = if created_items.is_empty() {
        "taskboard init: nothing to do"
    } else {
        "taskboard init: initialized"
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("root", storage.root().display().to_string());
    human.push_summary(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    human.push_next_step("taskboard user signup <name> --password <password>");
    human.push_next_step("taskboard task new <title>");

    emit_success(OutputOptions { json, quiet }, "init", &report, Some(&human))
}

/// Write the default config unless one exists; an existing file is kept as is.
fn ensure_config(storage: &Storage) -> Result<bool> {
    let path = storage.config_file();
    if path.is_file() {
        return Ok(false);
    }
    Config::default().save(&path)?;
    Ok(true)
}
