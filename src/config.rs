//! Configuration loading and management
//!
//! Handles parsing of `kanban.toml` in the data directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Config file name inside the data directory
pub const CONFIG_FILE: &str = "kanban.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Column layout
    #[serde(default)]
    pub board: BoardConfig,

    /// Storage behavior
    #[serde(default)]
    pub storage: StorageConfig,

    /// First-run dataset
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Column layout of every board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Status columns, left to right
    #[serde(default = "default_columns")]
    pub columns: Vec<ColumnEntry>,

    /// Status for new tasks when none is given
    #[serde(default = "default_status")]
    pub default_status: String,
}

/// Column entry with an optional display title.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnEntry {
    /// Status key; title is the key in upper case.
    Simple(String),
    /// Status key with an explicit title.
    WithTitle {
        #[serde(alias = "status")]
        key: String,
        title: String,
    },
}

/// Normalized column with an explicit title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub key: String,
    pub title: String,
}

fn default_columns() -> Vec<ColumnEntry> {
    ["todo", "doing", "done"]
        .into_iter()
        .map(|key| ColumnEntry::Simple(key.to_string()))
        .collect()
}

fn default_status() -> String {
    "todo".to_string()
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            default_status: default_status(),
        }
    }
}

impl BoardConfig {
    pub fn columns(&self) -> Vec<Column> {
        self.columns
            .iter()
            .map(|entry| match entry {
                ColumnEntry::Simple(key) => Column {
                    key: key.trim().to_string(),
                    title: key.trim().to_uppercase(),
                },
                ColumnEntry::WithTitle { key, title } => Column {
                    key: key.trim().to_string(),
                    title: title.to_string(),
                },
            })
            .collect()
    }

    /// Status keys in column order
    pub fn column_keys(&self) -> Vec<String> {
        self.columns().into_iter().map(|column| column.key).collect()
    }

    fn validate(&self) -> Result<()> {
        let columns = self.columns();
        if columns.is_empty() {
            return Err(Error::InvalidConfig(
                "board.columns cannot be empty".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for column in &columns {
            if column.key.is_empty() {
                return Err(Error::InvalidConfig(
                    "board.columns cannot include empty keys".to_string(),
                ));
            }
            if !seen.insert(column.key.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "board.columns has duplicate key '{}'",
                    column.key
                )));
            }
        }

        if !seen.contains(self.default_status.trim()) {
            return Err(Error::InvalidConfig(format!(
                "board.default_status '{}' not in board.columns",
                self.default_status
            )));
        }

        Ok(())
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Fail on unreadable task data instead of starting from an empty board
    #[serde(default)]
    pub strict: bool,
}

/// Seed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Seed the store on first run
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// JSON array of tasks to seed instead of the built-in board,
    /// relative to the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a `kanban.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|err| Error::InvalidConfig(format!("{}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data directory. Defaults apply only when
    /// there is no config file; an unreadable one is an error.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load(&config_path)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.board.validate()?;
        if let Some(file) = self.seed.file.as_ref() {
            if file.as_os_str().is_empty() {
                return Err(Error::InvalidConfig(
                    "seed.file cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Data directory when neither `--dir` nor `KANBAN_DIR` is given
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "kanban")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".kanban"))
}
