//! Storage adapter for the task collection
//!
//! Persists the full collection as JSON text under one key of a
//! [`KeyValueStore`]. Keys shared with the board UI:
//!
//! ```text
//! tasks          JSON array of tasks
//! showSideBar    "true" | "false"
//! activeBoard    JSON string, last selected board
//! light-theme    "enabled" | "disabled"
//! ```

use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::seed::SeedData;
use crate::task::Task;

pub const TASKS_KEY: &str = "tasks";
pub const SHOW_SIDEBAR_KEY: &str = "showSideBar";
pub const ACTIVE_BOARD_KEY: &str = "activeBoard";
pub const LIGHT_THEME_KEY: &str = "light-theme";

/// What `load` does with persisted text it cannot parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptStatePolicy {
    /// Log a warning and read an empty collection. The next save replaces
    /// the unreadable data.
    #[default]
    Reset,
    /// Return [`Error::CorruptState`].
    Surface,
}

impl CorruptStatePolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Surface
        } else {
            Self::Reset
        }
    }
}

#[derive(Debug, Clone)]
pub struct Storage<S> {
    store: S,
    policy: CorruptStatePolicy,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: CorruptStatePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CorruptStatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> CorruptStatePolicy {
        self.policy
    }

    /// Full persisted collection; empty when nothing was ever saved.
    pub fn load(&self) -> Result<Vec<Task>> {
        let raw = match self.store.get_item(TASKS_KEY) {
            Ok(raw) => raw,
            Err(Error::CorruptState(reason)) => return self.recover(reason),
            Err(err) => return Err(err),
        };

        let Some(raw) = raw else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => Ok(tasks),
            Err(err) => self.recover(format!("{TASKS_KEY}: {err}")),
        }
    }

    /// Replace the persisted collection with `tasks`.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string(tasks)?;
        self.store.set_item(TASKS_KEY, &json)
    }

    /// Whether a task collection has ever been persisted
    pub fn is_initialized(&self) -> Result<bool> {
        match self.store.get_item(TASKS_KEY) {
            Ok(raw) => Ok(raw.is_some()),
            Err(Error::CorruptState(_)) => Ok(true),
            Err(err) => Err(err),
        }
    }

    /// Seed the store on first run: the seed collection plus a visible
    /// sidebar. Does nothing when a collection already exists. Returns
    /// whether seeding happened.
    pub fn initialize(&self, seed: &SeedData) -> Result<bool> {
        if self.is_initialized()? {
            tracing::debug!("task collection already present, skipping seed");
            return Ok(false);
        }

        self.save(seed.tasks())?;
        self.store.set_item(SHOW_SIDEBAR_KEY, "true")?;
        tracing::info!(tasks = seed.tasks().len(), "seeded task collection");
        Ok(true)
    }

    /// Remove every key, tasks and UI preferences alike.
    pub fn reset(&self) -> Result<()> {
        tracing::info!("clearing store");
        self.store.clear()
    }

    fn recover(&self, reason: String) -> Result<Vec<Task>> {
        match self.policy {
            CorruptStatePolicy::Reset => {
                tracing::warn!(%reason, "persisted tasks unreadable, using empty collection");
                Ok(Vec::new())
            }
            CorruptStatePolicy::Surface => Err(Error::CorruptState(reason)),
        }
    }
}
