//! kanban task command implementations.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{NewTask, Task, TaskId, TaskPatch};

use super::Session;

pub struct ListOptions {
    pub board: Option<String>,
    pub status: Option<String>,
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct NewOptions {
    pub title: String,
    pub description: String,
    pub status: Option<String>,
    pub board: Option<String>,
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct EditOptions {
    /// `task edit` or `task move`, for the output envelope
    pub command: &'static str,
    pub id: TaskId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(serde::Serialize)]
struct TaskListOutput {
    total: usize,
    tasks: Vec<Task>,
}

#[derive(serde::Serialize)]
struct TaskEditOutput {
    id: TaskId,
    updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<Task>,
}

#[derive(serde::Serialize)]
struct TaskRemoveOutput {
    id: TaskId,
    removed: bool,
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let session = Session::open(options.dir)?;
    let tasks: Vec<Task> = session
        .repo
        .list_all()?
        .into_iter()
        .filter(|task| match options.board.as_deref() {
            Some(board) => task.is_on_board(board),
            None => true,
        })
        .filter(|task| match options.status.as_deref() {
            Some(status) => task.status == status,
            None => true,
        })
        .collect();

    let mut human = HumanOutput::new(format!("{} task(s)", tasks.len()));
    for task in &tasks {
        human.push_detail(task_line(task));
    }
    if tasks.is_empty() {
        human.push_next_step("kanban task new <title>");
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tasks,
    };
    emit_success(options.output, "task list", &output, Some(&human))
}

pub fn run_show(id: TaskId, dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let session = Session::open(dir)?;
    let task = session.repo.get(id)?.ok_or(Error::NotFound(id))?;

    let mut human = HumanOutput::new(format!("Task {}", task.id));
    push_task_summary(&mut human, &task);
    if !task.description.is_empty() {
        human.push_detail(task.description.clone());
    }

    emit_success(output, "task show", &task, Some(&human))
}

pub fn run_new(options: NewOptions) -> Result<()> {
    if options.board.as_deref().is_some_and(|board| board.trim().is_empty()) {
        return Err(Error::InvalidArgument("--board cannot be blank".to_string()));
    }
    let session = Session::open(options.dir)?;

    let board = match options.board {
        Some(board) => board,
        None => {
            let tasks = session.repo.list_all()?;
            session
                .board_context(&tasks)?
                .active
                .ok_or_else(|| {
                    Error::InvalidArgument(
                        "no boards exist yet; pass --board to start one".to_string(),
                    )
                })?
        }
    };
    let status = options
        .status
        .unwrap_or_else(|| session.config.board.default_status.clone());

    let task = session.repo.create(
        NewTask::new(options.title, status)
            .description(options.description)
            .board(board),
    )?;

    let mut human = HumanOutput::new("Task created");
    push_task_summary(&mut human, &task);

    emit_success(options.output, "task new", &task, Some(&human))
}

/// Shared by `task edit` and `task move`.
pub fn run_edit(options: EditOptions) -> Result<()> {
    let command = options.command;
    let patch = TaskPatch {
        title: options.title,
        description: options.description,
        status: options.status,
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change: pass --title, --description or --status".to_string(),
        ));
    }

    let session = Session::open(options.dir)?;
    let id = options.id;

    match session.repo.patch(id, patch) {
        Ok(task) => {
            let mut human = HumanOutput::new("Task updated");
            push_task_summary(&mut human, &task);
            let output = TaskEditOutput {
                id,
                updated: true,
                task: Some(task),
            };
            emit_success(options.output, command, &output, Some(&human))
        }
        // The board may have changed since the id was read; nothing to update.
        Err(Error::NotFound(missing)) => {
            tracing::warn!(id = missing, "patch target missing, nothing updated");
            let mut human = HumanOutput::new("No task updated");
            human.push_warning(format!("no task with id {missing}"));
            human.push_next_step("kanban task list");
            let output = TaskEditOutput {
                id,
                updated: false,
                task: None,
            };
            emit_success(options.output, command, &output, Some(&human))
        }
        Err(err) => Err(err),
    }
}

pub fn run_rm(id: TaskId, dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let session = Session::open(dir)?;
    let removed = session.repo.remove(id)?;

    let mut human = if removed {
        HumanOutput::new("Task removed")
    } else {
        let mut human = HumanOutput::new("No task removed");
        human.push_warning(format!("no task with id {id}"));
        human
    };
    human.push_summary("ID", id.to_string());

    emit_success(
        output,
        "task rm",
        &TaskRemoveOutput { id, removed },
        Some(&human),
    )
}

fn push_task_summary(human: &mut HumanOutput, task: &Task) {
    human.push_summary("ID", task.id.to_string());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Status", task.status.clone());
    human.push_summary("Board", task.board_name().unwrap_or("-").to_string());
}

fn task_line(task: &Task) -> String {
    match task.board_name() {
        Some(board) => format!("#{} [{}] {} ({board})", task.id, task.status, task.title),
        None => format!("#{} [{}] {}", task.id, task.status, task.title),
    }
}
