use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::task::{NewTask, Task, TaskId, TaskPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    NewTask,
    EditTask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFieldId {
    Title,
    Description,
    Status,
    Board,
}

#[derive(Debug, Clone)]
pub struct EditorField {
    pub id: EditorFieldId,
    pub label: &'static str,
    pub value: String,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    Cancel,
    Submit,
    /// Open the description in `$VISUAL`/`$EDITOR`
    ExternalEdit,
}

/// Modal form for creating or editing a task.
#[derive(Debug, Clone)]
pub struct EditorState {
    kind: EditorKind,
    fields: Vec<EditorField>,
    statuses: Vec<String>,
    active: usize,
    confirming: bool,
    error: Option<String>,
    task_id: Option<TaskId>,
}

impl EditorState {
    pub fn new_task(statuses: Vec<String>, status: &str, board: Option<&str>) -> Self {
        Self {
            kind: EditorKind::NewTask,
            fields: vec![
                text_field(EditorFieldId::Title, "Title", "", true),
                text_field(EditorFieldId::Description, "Description", "", false),
                text_field(EditorFieldId::Status, "Status", status, true),
                text_field(EditorFieldId::Board, "Board", board.unwrap_or(""), true),
            ],
            statuses,
            active: 0,
            confirming: false,
            error: None,
            task_id: None,
        }
    }

    pub fn edit_task(statuses: Vec<String>, task: &Task) -> Self {
        Self {
            kind: EditorKind::EditTask,
            fields: vec![
                text_field(EditorFieldId::Title, "Title", &task.title, true),
                text_field(
                    EditorFieldId::Description,
                    "Description",
                    &task.description,
                    false,
                ),
                text_field(EditorFieldId::Status, "Status", &task.status, true),
            ],
            statuses,
            active: 0,
            confirming: false,
            error: None,
            task_id: Some(task.id),
        }
    }

    pub fn kind(&self) -> EditorKind {
        self.kind
    }

    pub fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    pub fn fields(&self) -> &[EditorField] {
        &self.fields
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn confirming(&self) -> bool {
        self.confirming
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.confirming = false;
    }

    pub fn description(&self) -> &str {
        self.field_value(EditorFieldId::Description)
    }

    pub fn set_description(&mut self, value: String) {
        if let Some(field) = self
            .fields
            .iter_mut()
            .find(|field| field.id == EditorFieldId::Description)
        {
            field.value = value;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorAction {
        if self.confirming {
            return self.handle_confirm_key(key);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('u') => {
                    if let Some(field) = self.current_text_field_mut() {
                        field.value.clear();
                    }
                    self.error = None;
                }
                KeyCode::Char('e') => return EditorAction::ExternalEdit,
                _ => {}
            }
            return EditorAction::None;
        }

        match key.code {
            KeyCode::Esc => return EditorAction::Cancel,
            KeyCode::Tab | KeyCode::Down => self.move_active(1),
            KeyCode::BackTab | KeyCode::Up => self.move_active(-1),
            KeyCode::Left if self.on_status() => self.cycle_status(-1),
            KeyCode::Right if self.on_status() => self.cycle_status(1),
            KeyCode::Enter => {
                if self.active + 1 >= self.fields.len() {
                    return self.attempt_confirm();
                }
                self.move_active(1);
            }
            KeyCode::Backspace => {
                if let Some(field) = self.current_text_field_mut() {
                    field.value.pop();
                }
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    if let Some(field) = self.current_text_field_mut() {
                        field.value.push(ch);
                    }
                }
            }
            _ => {}
        }

        self.error = None;
        EditorAction::None
    }

    /// Input for a new task. Callers check `kind()` first.
    pub fn build_new(&self) -> Result<NewTask, String> {
        self.validate()?;
        let mut input = NewTask::new(
            self.field_value(EditorFieldId::Title).trim(),
            self.field_value(EditorFieldId::Status),
        )
        .description(self.field_value(EditorFieldId::Description));
        let board = self.field_value(EditorFieldId::Board).trim();
        if !board.is_empty() {
            input = input.board(board);
        }
        Ok(input)
    }

    /// Patch carrying every editable field.
    pub fn build_patch(&self) -> Result<TaskPatch, String> {
        self.validate()?;
        Ok(TaskPatch {
            title: Some(self.field_value(EditorFieldId::Title).trim().to_string()),
            description: Some(self.field_value(EditorFieldId::Description).to_string()),
            status: Some(self.field_value(EditorFieldId::Status).to_string()),
        })
    }

    fn attempt_confirm(&mut self) -> EditorAction {
        match self.validate() {
            Ok(()) => {
                self.confirming = true;
                EditorAction::None
            }
            Err(err) => {
                self.error = Some(err);
                self.confirming = false;
                EditorAction::None
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> EditorAction {
        match key.code {
            KeyCode::Esc => EditorAction::Cancel,
            KeyCode::Backspace | KeyCode::Char('e') => {
                self.confirming = false;
                self.error = None;
                EditorAction::None
            }
            KeyCode::Char('y') | KeyCode::Enter => EditorAction::Submit,
            _ => EditorAction::None,
        }
    }

    fn validate(&self) -> Result<(), String> {
        for field in self.fields.iter().filter(|field| field.required) {
            if field.value.trim().is_empty() {
                return Err(format!("{} is required", field.label.to_lowercase()));
            }
        }
        Ok(())
    }

    fn on_status(&self) -> bool {
        self.fields
            .get(self.active)
            .is_some_and(|field| field.id == EditorFieldId::Status)
    }

    fn cycle_status(&mut self, delta: isize) {
        if self.statuses.is_empty() {
            return;
        }
        let current = self.field_value(EditorFieldId::Status).to_string();
        let len = self.statuses.len() as isize;
        let next = match self.statuses.iter().position(|status| *status == current) {
            Some(index) => (index as isize + delta).rem_euclid(len) as usize,
            None => 0,
        };
        let status = self.statuses[next].clone();
        if let Some(field) = self.fields.get_mut(self.active) {
            field.value = status;
        }
    }

    fn move_active(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        if len == 0 {
            self.active = 0;
            return;
        }
        let next = (self.active as isize + delta).rem_euclid(len);
        self.active = next as usize;
    }

    /// Active field if free text can be typed into it. The status field
    /// only cycles through the configured columns, unless there are none.
    fn current_text_field_mut(&mut self) -> Option<&mut EditorField> {
        let restricted = !self.statuses.is_empty();
        self.fields
            .get_mut(self.active)
            .filter(|field| !(restricted && field.id == EditorFieldId::Status))
    }

    fn field_value(&self, id: EditorFieldId) -> &str {
        self.fields
            .iter()
            .find(|field| field.id == id)
            .map(|field| field.value.as_str())
            .unwrap_or("")
    }
}

fn text_field(id: EditorFieldId, label: &'static str, value: &str, required: bool) -> EditorField {
    EditorField {
        id,
        label,
        value: value.to_string(),
        required,
    }
}
