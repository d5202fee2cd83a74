//! Tasks and the task repository.
//!
//! The repository owns create/read/update/delete over the persisted task
//! collection. It keeps nothing in memory between calls: every operation
//! loads the full collection from [`Storage`], computes the next state and
//! writes the full collection back.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::storage::Storage;

/// Task identifier, unique within a collection and never reused while the
/// highest id is still present.
pub type TaskId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    /// Board the task belongs to. `None` (or an empty string in older data)
    /// means unassigned.
    #[serde(default)]
    pub board: Option<String>,
}

impl Task {
    /// Board name if the task is assigned to a non-empty board
    pub fn board_name(&self) -> Option<&str> {
        self.board.as_deref().filter(|board| !board.is_empty())
    }

    pub fn is_on_board(&self, board: &str) -> bool {
        self.board_name() == Some(board)
    }
}

/// Input for [`TaskRepository::create`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: String,
    pub board: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: status.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn board(mut self, board: impl Into<String>) -> Self {
        self.board = Some(board.into());
        self
    }
}

/// Partial update for [`TaskRepository::patch`]. `None` fields are left as
/// they are; the board is never changed by a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl TaskPatch {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct TaskRepository<S> {
    storage: Storage<S>,
    columns: Vec<String>,
}

impl<S: KeyValueStore> TaskRepository<S> {
    /// `columns` are the status keys a task may carry. An empty list accepts
    /// any non-empty status.
    pub fn new(storage: Storage<S>, columns: Vec<String>) -> Self {
        Self { storage, columns }
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Every task in the collection, unfiltered, in stored order.
    pub fn list_all(&self) -> Result<Vec<Task>> {
        self.storage.load()
    }

    pub fn get(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.storage.load()?.into_iter().find(|task| task.id == id))
    }

    /// Validate, assign the next id, append and persist.
    pub fn create(&self, input: NewTask) -> Result<Task> {
        let title = normalize_title(&input.title)?;
        let status = self.normalize_status(&input.status)?;
        let board = input
            .board
            .map(|board| board.trim().to_string())
            .filter(|board| !board.is_empty());

        let mut tasks = self.storage.load()?;
        let id = next_task_id(&tasks)?;
        let task = Task {
            id,
            title,
            description: input.description,
            status,
            board,
        };
        tasks.push(task.clone());
        self.storage.save(&tasks)?;

        tracing::debug!(id, status = %task.status, board = ?task.board, "task created");
        Ok(task)
    }

    /// Merge the provided fields into the task with `id` and persist.
    pub fn patch(&self, id: TaskId, patch: TaskPatch) -> Result<Task> {
        let title = patch.title.as_deref().map(normalize_title).transpose()?;
        let status = patch
            .status
            .as_deref()
            .map(|status| self.normalize_status(status))
            .transpose()?;

        let mut tasks = self.storage.load()?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(Error::NotFound(id))?;

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(status) = status {
            task.status = status;
        }
        let updated = task.clone();
        self.storage.save(&tasks)?;

        tracing::debug!(id, status = %updated.status, "task patched");
        Ok(updated)
    }

    /// Remove the task with `id`. Removing an unknown id changes nothing and
    /// is not an error; the return value tells whether a task was removed.
    pub fn remove(&self, id: TaskId) -> Result<bool> {
        let mut tasks = self.storage.load()?;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        let removed = tasks.len() != before;
        self.storage.save(&tasks)?;

        tracing::debug!(id, removed, "task remove");
        Ok(removed)
    }

    fn normalize_status(&self, status: &str) -> Result<String> {
        let status = status.trim();
        if status.is_empty() {
            return Err(Error::Validation("status cannot be empty".to_string()));
        }
        if !self.columns.is_empty() && !self.columns.iter().any(|column| column == status) {
            return Err(Error::Validation(format!(
                "unknown status '{status}' (expected one of: {})",
                self.columns.join(", ")
            )));
        }
        Ok(status.to_string())
    }
}

fn normalize_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::Validation("title cannot be empty".to_string()));
    }
    Ok(title.to_string())
}

/// One past the highest id in the collection, or 1 when it is empty.
pub fn next_task_id(tasks: &[Task]) -> Result<TaskId> {
    match tasks.iter().map(|task| task.id).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| Error::OperationFailed("task id space exhausted".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use std::collections::HashSet;

    fn columns() -> Vec<String> {
        vec!["todo".to_string(), "doing".to_string(), "done".to_string()]
    }

    fn repo() -> TaskRepository<MemoryStore> {
        TaskRepository::new(Storage::new(MemoryStore::new()), columns())
    }

    #[test]
    fn create_on_empty_storage_assigns_id_one() {
        let repo = repo();
        let task = repo
            .create(NewTask::new("Buy milk", "todo").board("Home"))
            .unwrap();

        assert_eq!(task.id, 1);
        assert_eq!(task.board.as_deref(), Some("Home"));
        assert_eq!(task.description, "");

        let all = repo.list_all().unwrap();
        assert_eq!(all, vec![task]);
    }

    #[test]
    fn create_rejects_blank_title() {
        let repo = repo();
        let err = repo.create(NewTask::new("   ", "todo")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(repo.list_all().unwrap().is_empty());
    }

    #[test]
    fn create_rejects_unknown_status() {
        let repo = repo();
        let err = repo.create(NewTask::new("Write", "later")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn create_accepts_any_status_without_columns() {
        let repo = TaskRepository::new(Storage::new(MemoryStore::new()), Vec::new());
        let task = repo.create(NewTask::new("Write", "later")).unwrap();
        assert_eq!(task.status, "later");
    }

    #[test]
    fn create_trims_title_and_drops_empty_board() {
        let repo = repo();
        let task = repo
            .create(NewTask::new("  Plan  ", " doing ").board("  "))
            .unwrap();
        assert_eq!(task.title, "Plan");
        assert_eq!(task.status, "doing");
        assert_eq!(task.board, None);
    }

    #[test]
    fn ids_are_unique_across_creates_and_removals() {
        let repo = repo();
        let mut ids = HashSet::new();
        for idx in 0..5 {
            let task = repo
                .create(NewTask::new(format!("task {idx}"), "todo"))
                .unwrap();
            assert!(ids.insert(task.id));
        }

        repo.remove(2).unwrap();
        let next = repo.create(NewTask::new("after removal", "todo")).unwrap();
        assert_eq!(next.id, 6);
        assert!(ids.insert(next.id));
    }

    #[test]
    fn patch_changes_only_provided_fields() {
        let repo = repo();
        let created = repo
            .create(
                NewTask::new("Buy milk", "todo")
                    .description("2 litres")
                    .board("Home"),
            )
            .unwrap();

        let patched = repo.patch(created.id, TaskPatch::status("done")).unwrap();
        assert_eq!(patched.status, "done");
        assert_eq!(patched.title, created.title);
        assert_eq!(patched.description, created.description);
        assert_eq!(patched.board, created.board);
        assert_eq!(patched.id, created.id);

        assert_eq!(repo.get(created.id).unwrap(), Some(patched));
    }

    #[test]
    fn patch_title_and_description() {
        let repo = repo();
        let created = repo.create(NewTask::new("Draft", "todo")).unwrap();

        let patched = repo
            .patch(
                created.id,
                TaskPatch {
                    title: Some("Final".to_string()),
                    description: Some(String::new()),
                    status: None,
                },
            )
            .unwrap();
        assert_eq!(patched.title, "Final");
        assert_eq!(patched.status, "todo");
    }

    #[test]
    fn patch_missing_task_is_not_found() {
        let repo = repo();
        let err = repo.patch(42, TaskPatch::status("done")).unwrap_err();
        assert!(matches!(err, Error::NotFound(42)));
    }

    #[test]
    fn patch_rejects_blank_title_without_writing() {
        let repo = repo();
        let created = repo.create(NewTask::new("Keep", "todo")).unwrap();
        let err = repo
            .patch(
                created.id,
                TaskPatch {
                    title: Some(" ".to_string()),
                    ..TaskPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(repo.get(created.id).unwrap().unwrap().title, "Keep");
    }

    #[test]
    fn remove_is_idempotent() {
        let repo = repo();
        let keep = repo.create(NewTask::new("keep", "todo")).unwrap();
        let drop = repo.create(NewTask::new("drop", "todo")).unwrap();

        assert!(repo.remove(drop.id).unwrap());
        let after_first = repo.list_all().unwrap();

        assert!(!repo.remove(drop.id).unwrap());
        assert_eq!(repo.list_all().unwrap(), after_first);
        assert_eq!(after_first, vec![keep]);
    }

    #[test]
    fn next_task_id_handles_gaps() {
        let tasks = vec![
            Task {
                id: 7,
                title: "a".to_string(),
                description: String::new(),
                status: "todo".to_string(),
                board: None,
            },
            Task {
                id: 3,
                title: "b".to_string(),
                description: String::new(),
                status: "todo".to_string(),
                board: None,
            },
        ];
        assert_eq!(next_task_id(&tasks).unwrap(), 8);
        assert_eq!(next_task_id(&[]).unwrap(), 1);
    }

    #[test]
    fn deserializes_legacy_tasks() {
        let json = r#"[{"id":1,"title":"Old","status":"todo"},{"id":2,"title":"Empty","status":"done","board":""}]"#;
        let tasks: Vec<Task> = serde_json::from_str(json).unwrap();
        assert_eq!(tasks[0].description, "");
        assert_eq!(tasks[0].board, None);
        assert_eq!(tasks[1].board_name(), None);
    }
}
