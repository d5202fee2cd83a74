//! kanban - Local Kanban Board Library
//!
//! This library provides the core functionality for the kanban CLI tool:
//! tasks grouped into boards and status columns, persisted in a small
//! string key-value store.
//!
//! # Core Concepts
//!
//! - **Tasks**: title, description, status and board, addressed by numeric id
//! - **Boards**: never stored, derived from the board names on tasks
//! - **Status columns**: configured in `kanban.toml`, always shown in order
//! - **Preferences**: sidebar visibility, active board and theme
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `kanban.toml`
//! - `error`: Error types and result aliases
//! - `kv`: Key-value store trait with file and in-memory backends
//! - `storage`: Task collection persistence over a key-value store
//! - `task`: Task model and repository
//! - `board`: Board list and status grouping projections
//! - `prefs`: UI preferences
//! - `seed`: First-run dataset
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON command output
//! - `ui`: Interactive terminal board

pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod kv;
pub mod lock;
pub mod output;
pub mod prefs;
pub mod seed;
pub mod storage;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
