//! Derived board views.
//!
//! Boards are never stored: they are the distinct board names found on
//! tasks, recomputed from the collection every time. Nothing here touches
//! storage.

use serde::Serialize;

use crate::task::Task;

/// Distinct non-empty board names in first-seen order.
pub fn distinct_boards(tasks: &[Task]) -> Vec<String> {
    let mut boards: Vec<String> = Vec::new();
    for board in tasks.iter().filter_map(Task::board_name) {
        if !boards.iter().any(|seen| seen == board) {
            boards.push(board.to_string());
        }
    }
    boards
}

/// Tasks of one status column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusColumn {
    pub status: String,
    pub tasks: Vec<Task>,
}

/// Tasks of one board partitioned by status.
///
/// Every configured column is present, in column order, even when empty.
/// Statuses outside the configured columns follow in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusGroups {
    columns: Vec<StatusColumn>,
}

impl StatusGroups {
    /// Tasks under `status`, or `None` if the status is neither configured
    /// nor used by any task on the board.
    pub fn get(&self, status: &str) -> Option<&[Task]> {
        self.columns
            .iter()
            .find(|column| column.status == status)
            .map(|column| column.tasks.as_slice())
    }

    pub fn columns(&self) -> &[StatusColumn] {
        &self.columns
    }

    pub fn statuses(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.status.as_str())
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|column| column.tasks.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Filter `tasks` to `board` and partition them by status.
pub fn group_by_board_and_status(tasks: &[Task], board: &str, columns: &[String]) -> StatusGroups {
    let mut groups: Vec<StatusColumn> = columns
        .iter()
        .map(|status| StatusColumn {
            status: status.clone(),
            tasks: Vec::new(),
        })
        .collect();

    for task in tasks.iter().filter(|task| task.is_on_board(board)) {
        match groups.iter_mut().find(|column| column.status == task.status) {
            Some(column) => column.tasks.push(task.clone()),
            None => groups.push(StatusColumn {
                status: task.status.clone(),
                tasks: vec![task.clone()],
            }),
        }
    }

    StatusGroups { columns: groups }
}

/// The persisted choice if it still names a board, else the first board,
/// else none.
pub fn active_board_selection(boards: &[String], persisted: Option<&str>) -> Option<String> {
    persisted
        .filter(|choice| boards.iter().any(|board| board == choice))
        .map(str::to_string)
        .or_else(|| boards.first().cloned())
}

/// Boards list plus the active selection, passed explicitly between the
/// projection and the UI. Re-resolve after every change to the tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardContext {
    pub boards: Vec<String>,
    pub active: Option<String>,
}

impl BoardContext {
    pub fn resolve(tasks: &[Task], persisted: Option<&str>) -> Self {
        let boards = distinct_boards(tasks);
        let active = active_board_selection(&boards, persisted);
        Self { boards, active }
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_index(&self) -> Option<usize> {
        let active = self.active.as_deref()?;
        self.boards.iter().position(|board| board == active)
    }

    /// Make `board` active. Returns false (and changes nothing) when no task
    /// references that board.
    pub fn select(&mut self, board: &str) -> bool {
        if self.boards.iter().any(|candidate| candidate == board) {
            self.active = Some(board.to_string());
            true
        } else {
            false
        }
    }

    /// Move the selection `delta` boards along the list, wrapping around.
    pub fn cycle(&mut self, delta: isize) -> Option<&str> {
        if self.boards.is_empty() {
            return None;
        }
        let len = self.boards.len() as isize;
        let current = self.active_index().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active = Some(self.boards[next].clone());
        self.active.as_deref()
    }

    /// Group the active board's tasks; empty when there is no active board.
    pub fn groups(&self, tasks: &[Task], columns: &[String]) -> StatusGroups {
        match self.active.as_deref() {
            Some(board) => group_by_board_and_status(tasks, board, columns),
            None => StatusGroups::default(),
        }
    }
}
