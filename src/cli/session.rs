//! Opened data directory shared by every command.

use std::path::PathBuf;

use crate::board::BoardContext;
use crate::config::{default_data_dir, Column, Config};
use crate::error::Result;
use crate::kv::FileStore;
use crate::prefs::Preferences;
use crate::seed::SeedData;
use crate::storage::{CorruptStatePolicy, Storage};
use crate::task::{Task, TaskRepository};

pub struct Session {
    pub dir: PathBuf,
    pub config: Config,
    pub repo: TaskRepository<FileStore>,
    pub prefs: Preferences<FileStore>,
    /// Whether opening the session seeded a fresh store
    pub seeded: bool,
}

impl Session {
    /// Open the data directory and seed it on first use.
    pub fn open(dir: Option<PathBuf>) -> Result<Self> {
        let dir = dir.unwrap_or_else(default_data_dir);
        let config = Config::load_from_dir(&dir)?;
        let store = FileStore::open(&dir);

        let policy = CorruptStatePolicy::from_strict(config.storage.strict);
        let storage = Storage::new(store.clone()).with_policy(policy);
        let seed = SeedData::from_config(&config.seed, &dir)?;
        let seeded = storage.initialize(&seed)?;

        tracing::debug!(dir = %dir.display(), seeded, "session opened");

        let repo = TaskRepository::new(storage, config.board.column_keys());
        let prefs = Preferences::new(store).with_policy(policy);
        Ok(Self {
            dir,
            config,
            repo,
            prefs,
            seeded,
        })
    }

    pub fn columns(&self) -> Vec<Column> {
        self.config.board.columns()
    }

    /// Boards derived from `tasks` with the persisted selection applied.
    pub fn board_context(&self, tasks: &[Task]) -> Result<BoardContext> {
        let persisted = self.prefs.active_board()?;
        Ok(BoardContext::resolve(tasks, persisted.as_deref()))
    }
}
