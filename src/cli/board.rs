//! kanban board command implementations.

use std::path::PathBuf;

use crate::board::{distinct_boards, StatusColumn};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};

use super::Session;

pub struct ShowOptions {
    pub board: Option<String>,
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(serde::Serialize)]
struct BoardSummary {
    name: String,
    active: bool,
    tasks: usize,
}

#[derive(serde::Serialize)]
struct BoardListOutput {
    active: Option<String>,
    boards: Vec<BoardSummary>,
}

#[derive(serde::Serialize)]
struct BoardShowOutput {
    board: Option<String>,
    columns: Vec<ColumnOutput>,
}

#[derive(serde::Serialize)]
struct ColumnOutput {
    #[serde(flatten)]
    column: StatusColumn,
    title: String,
}

#[derive(serde::Serialize)]
struct BoardUseOutput {
    active: String,
}

pub fn run_list(dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let session = Session::open(dir)?;
    let tasks = session.repo.list_all()?;
    let context = session.board_context(&tasks)?;

    let boards: Vec<BoardSummary> = context
        .boards
        .iter()
        .map(|name| BoardSummary {
            name: name.clone(),
            active: context.active() == Some(name.as_str()),
            tasks: tasks.iter().filter(|task| task.is_on_board(name)).count(),
        })
        .collect();

    let mut human = HumanOutput::new(format!("{} board(s)", boards.len()));
    for board in &boards {
        let marker = if board.active { "*" } else { " " };
        human.push_detail(format!("{marker} {} ({} tasks)", board.name, board.tasks));
    }
    if boards.is_empty() {
        human.push_next_step("kanban task new <title> --board <name>");
    }

    let output_data = BoardListOutput {
        active: context.active.clone(),
        boards,
    };
    emit_success(output, "board list", &output_data, Some(&human))
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let session = Session::open(options.dir)?;
    let tasks = session.repo.list_all()?;
    let mut context = session.board_context(&tasks)?;

    if let Some(board) = options.board.as_deref() {
        if !context.select(board) {
            return Err(Error::InvalidArgument(format!("no board named '{board}'")));
        }
    }

    let columns = session.columns();
    let groups = context.groups(&tasks, session.repo.columns());
    let board = context.active.clone();

    let header = match board.as_deref() {
        Some(name) => format!("Board {name}"),
        None => "No boards".to_string(),
    };
    let mut human = HumanOutput::new(header);
    let mut output_columns = Vec::with_capacity(groups.len());
    for column in groups.columns() {
        let title = columns
            .iter()
            .find(|configured| configured.key == column.status)
            .map(|configured| configured.title.clone())
            .unwrap_or_else(|| column.status.to_uppercase());

        human.push_summary(title.clone(), column.tasks.len().to_string());
        for task in &column.tasks {
            human.push_detail(format!("{title}: #{} {}", task.id, task.title));
        }
        output_columns.push(ColumnOutput {
            column: column.clone(),
            title,
        });
    }
    if board.is_none() {
        human.push_next_step("kanban task new <title> --board <name>");
    }

    let output_data = BoardShowOutput {
        board,
        columns: output_columns,
    };
    emit_success(options.output, "board show", &output_data, Some(&human))
}

pub fn run_use(board: String, dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let session = Session::open(dir)?;
    let tasks = session.repo.list_all()?;
    if !distinct_boards(&tasks).contains(&board) {
        return Err(Error::InvalidArgument(format!("no board named '{board}'")));
    }

    session.prefs.set_active_board(&board)?;
    tracing::debug!(%board, "active board changed");

    let mut human = HumanOutput::new("Active board changed");
    human.push_summary("Board", board.clone());
    human.push_next_step("kanban board show");

    emit_success(
        output,
        "board use",
        &BoardUseOutput { active: board },
        Some(&human),
    )
}
