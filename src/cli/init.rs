//! kanban init command implementation
//!
//! Opens (and on first use seeds) the data directory.

use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

use super::Session;

#[derive(serde::Serialize)]
struct InitReport {
    dir: PathBuf,
    seeded: bool,
    tasks: usize,
    boards: Vec<String>,
    config_written: bool,
}

pub fn run(dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let session = Session::open(dir)?;

    let config_path = session.dir.join(CONFIG_FILE);
    let config_written = if config_path.exists() {
        false
    } else {
        Config::default().save(&config_path)?;
        true
    };

    let tasks = session.repo.list_all()?;
    let context = session.board_context(&tasks)?;

    let report = InitReport {
        dir: session.dir.clone(),
        seeded: session.seeded,
        tasks: tasks.len(),
        boards: context.boards.clone(),
        config_written,
    };

    let header = if session.seeded {
        "kanban initialized"
    } else {
        "kanban already initialized"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("dir", session.dir.display().to_string());
    human.push_summary("tasks", tasks.len().to_string());
    human.push_summary("boards", context.boards.join(", "));
    if config_written {
        human.push_detail(format!("wrote default {CONFIG_FILE}"));
    }
    human.push_next_step("kanban board show");

    emit_success(output, "init", &report, Some(&human))
}
