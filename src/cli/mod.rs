//! Command-line interface for kanban
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::output::OutputOptions;

mod board;
mod init;
mod prefs;
mod session;
mod task;

pub use session::Session;

/// kanban - a local kanban board
///
/// Boards, status columns and tasks kept in a file-backed key-value store.
#[derive(Parser, Debug)]
#[command(name = "kanban")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding store.json and kanban.toml
    #[arg(long, global = true, env = "KANBAN_DIR")]
    pub dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Seed the data directory on first use
    Init,

    /// Boards derived from tasks
    #[command(subcommand)]
    Board(BoardCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Show or hide the board sidebar
    Sidebar {
        /// show or hide
        state: String,
    },

    /// Show or set the board theme
    Theme {
        /// light or dark
        theme: Option<String>,
    },

    /// Remove all tasks and preferences
    Reset {
        /// Required: confirms that all data is dropped
        #[arg(long)]
        force: bool,
    },

    /// Interactive board in the terminal
    Tui,
}

/// Board subcommands
#[derive(Subcommand, Debug)]
pub enum BoardCommands {
    /// List boards
    List,

    /// Show a board's columns (defaults to the active board)
    Show {
        /// Board name
        board: Option<String>,
    },

    /// Make a board the active board
    Use {
        /// Board name
        board: String,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks
    List {
        /// Only tasks on this board
        #[arg(short, long)]
        board: Option<String>,

        /// Only tasks with this status
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Show one task
    Show {
        /// Task id
        id: u64,
    },

    /// Create a task
    New {
        /// Task title
        title: String,

        /// Task description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Status column (defaults to board.default_status)
        #[arg(short, long)]
        status: Option<String>,

        /// Board (defaults to the active board)
        #[arg(short, long)]
        board: Option<String>,
    },

    /// Change a task's title, description or status
    Edit {
        /// Task id
        id: u64,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New status
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Move a task to another status column
    Move {
        /// Task id
        id: u64,

        /// Target status
        status: String,
    },

    /// Delete a task
    Rm {
        /// Task id
        id: u64,
    },
}

impl Cli {
    pub fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }

    pub fn run(self) -> Result<()> {
        let output = self.output();
        let dir = self.dir;
        match self.command {
            Commands::Init => init::run(dir, output),
            Commands::Board(cmd) => match cmd {
                BoardCommands::List => board::run_list(dir, output),
                BoardCommands::Show { board } => board::run_show(board::ShowOptions {
                    board,
                    dir,
                    output,
                }),
                BoardCommands::Use { board } => board::run_use(board, dir, output),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::List { board, status } => task::run_list(task::ListOptions {
                    board,
                    status,
                    dir,
                    output,
                }),
                TaskCommands::Show { id } => task::run_show(id, dir, output),
                TaskCommands::New {
                    title,
                    description,
                    status,
                    board,
                } => task::run_new(task::NewOptions {
                    title,
                    description,
                    status,
                    board,
                    dir,
                    output,
                }),
                TaskCommands::Edit {
                    id,
                    title,
                    description,
                    status,
                } => task::run_edit(task::EditOptions {
                    command: "task edit",
                    id,
                    title,
                    description,
                    status,
                    dir,
                    output,
                }),
                TaskCommands::Move { id, status } => task::run_edit(task::EditOptions {
                    command: "task move",
                    id,
                    title: None,
                    description: None,
                    status: Some(status),
                    dir,
                    output,
                }),
                TaskCommands::Rm { id } => task::run_rm(id, dir, output),
            },
            Commands::Sidebar { state } => prefs::run_sidebar(&state, dir, output),
            Commands::Theme { theme } => prefs::run_theme(theme.as_deref(), dir, output),
            Commands::Reset { force } => prefs::run_reset(force, dir, output),
            Commands::Tui => {
                if output.json {
                    return Err(crate::error::Error::InvalidArgument(
                        "board TUI does not support --json".to_string(),
                    ));
                }
                let session = Session::open(dir)?;
                crate::ui::board_viewer::run(session)
            }
        }
    }
}
