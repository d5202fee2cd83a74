//! First-run dataset.
//!
//! The store is seeded once, when no task collection exists yet. The data
//! comes from `seed.file` in the config when set, otherwise from a small
//! built-in board.

use std::fs;
use std::path::Path;

use crate::config::SeedConfig;
use crate::error::{Error, Result};
use crate::task::Task;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedData {
    tasks: Vec<Task>,
}

impl SeedData {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Two example boards using the default columns.
    pub fn builtin() -> Self {
        let rows = [
            (1, "Explore the board", "Each board has a todo, doing and done column.", "done", "Getting Started"),
            (2, "Create your first task", "`kanban task new <title> --board <board>` or press n in `kanban tui`.", "doing", "Getting Started"),
            (3, "Move a task", "`kanban task move <id> done` changes its column.", "todo", "Getting Started"),
            (4, "Delete a finished task", "", "todo", "Getting Started"),
            (5, "Plan the week", "", "todo", "Personal"),
            (6, "Buy groceries", "Milk, eggs, bread", "doing", "Personal"),
        ];

        let tasks = rows
            .into_iter()
            .map(|(id, title, description, status, board)| Task {
                id,
                title: title.to_string(),
                description: description.to_string(),
                status: status.to_string(),
                board: Some(board.to_string()),
            })
            .collect();
        Self { tasks }
    }

    /// Read a JSON array of tasks. Ids must be unique.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let tasks: Vec<Task> = serde_json::from_str(&content).map_err(|err| {
            Error::InvalidConfig(format!("seed file {}: {err}", path.display()))
        })?;

        let mut seen = std::collections::HashSet::new();
        for task in &tasks {
            if !seen.insert(task.id) {
                return Err(Error::InvalidConfig(format!(
                    "seed file {}: duplicate task id {}",
                    path.display(),
                    task.id
                )));
            }
        }
        Ok(Self { tasks })
    }

    /// Seed selected by config; relative `seed.file` paths resolve against
    /// the data directory.
    pub fn from_config(config: &SeedConfig, data_dir: &Path) -> Result<Self> {
        if !config.enabled {
            return Ok(Self::empty());
        }
        match config.file.as_ref() {
            Some(file) => Self::from_file(&data_dir.join(file)),
            None => Ok(Self::builtin()),
        }
    }
}
