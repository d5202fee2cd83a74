use std::fs;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tempfile::NamedTempFile;

use crate::board::{BoardContext, StatusGroups};
use crate::cli::Session;
use crate::config::Column;
use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::prefs::{Preferences, Theme};
use crate::task::{Task, TaskId, TaskPatch, TaskRepository};

use super::editor::{EditorAction, EditorKind, EditorState};
use super::view;

const EVENT_POLL_MS: u64 = 120;
const WATCH_DEBOUNCE_MS: u64 = 200;

enum UiMsg {
    StoreChanged,
    WatchError(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeleteConfirmState {
    pub(crate) task_id: TaskId,
    pub(crate) title: String,
}

/// What the terminal loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
    /// Suspend the terminal and edit the open form's description externally
    EditDescription,
}

/// Board UI state. All persistence goes through the repository and the
/// preferences, so the same state drives the terminal and the tests.
pub struct AppState<S> {
    repo: TaskRepository<S>,
    prefs: Preferences<S>,
    pub(crate) columns: Vec<Column>,
    default_status: String,
    pub(crate) tasks: Vec<Task>,
    pub(crate) context: BoardContext,
    pub(crate) groups: StatusGroups,
    pub(crate) selected_column: usize,
    pub(crate) selected_row: usize,
    pub(crate) show_sidebar: bool,
    pub(crate) theme: Theme,
    pub(crate) editor: Option<EditorState>,
    pub(crate) delete_confirm: Option<DeleteConfirmState>,
    pub(crate) show_help: bool,
    status_message: Option<(StatusKind, String)>,
    watch_error: Option<String>,
}

impl<S: KeyValueStore> AppState<S> {
    pub fn new(
        repo: TaskRepository<S>,
        prefs: Preferences<S>,
        columns: Vec<Column>,
        default_status: String,
    ) -> Result<Self> {
        let show_sidebar = prefs.show_sidebar()?;
        let theme = prefs.theme()?;
        let mut app = Self {
            repo,
            prefs,
            columns,
            default_status,
            tasks: Vec::new(),
            context: BoardContext::default(),
            groups: StatusGroups::default(),
            selected_column: 0,
            selected_row: 0,
            show_sidebar,
            theme,
            editor: None,
            delete_confirm: None,
            show_help: false,
            status_message: None,
            watch_error: None,
        };
        app.reload()?;
        Ok(app)
    }

    /// Re-read tasks and the active board, keeping the selection in range.
    pub fn reload(&mut self) -> Result<()> {
        self.tasks = self.repo.list_all()?;
        let persisted = self.prefs.active_board()?;
        self.context = BoardContext::resolve(&self.tasks, persisted.as_deref());
        self.regroup();
        Ok(())
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.groups
            .columns()
            .get(self.selected_column)?
            .tasks
            .get(self.selected_row)
    }

    pub(crate) fn status_line(&self) -> Option<(StatusKind, &str)> {
        if let Some((kind, message)) = self.status_message.as_ref() {
            return Some((*kind, message.as_str()));
        }
        self.watch_error
            .as_deref()
            .map(|message| (StatusKind::Error, message))
    }

    /// Display title for a status key.
    pub(crate) fn column_title(&self, status: &str) -> String {
        self.columns
            .iter()
            .find(|column| column.key == status)
            .map(|column| column.title.clone())
            .unwrap_or_else(|| status.to_uppercase())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyOutcome::Quit;
        }

        if self.show_help {
            self.show_help = false;
            return KeyOutcome::Continue;
        }

        if let Some(confirm) = self.delete_confirm.take() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.delete_task(confirm.task_id),
                KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                    self.set_info("cancelled".to_string());
                }
                _ => self.delete_confirm = Some(confirm),
            }
            return KeyOutcome::Continue;
        }

        if let Some(editor) = self.editor.as_mut() {
            match editor.handle_key(key) {
                EditorAction::None => {}
                EditorAction::Cancel => {
                    self.editor = None;
                    self.set_info("cancelled".to_string());
                }
                EditorAction::Submit => self.submit_editor(),
                EditorAction::ExternalEdit => return KeyOutcome::EditDescription,
            }
            return KeyOutcome::Continue;
        }

        self.status_message = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return KeyOutcome::Quit,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('h') | KeyCode::Left => self.move_column(-1),
            KeyCode::Char('l') | KeyCode::Right => self.move_column(1),
            KeyCode::Char('j') | KeyCode::Down => self.move_row(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_row(-1),
            KeyCode::Char('[') => self.cycle_board(-1),
            KeyCode::Char(']') => self.cycle_board(1),
            KeyCode::Char('<') | KeyCode::Char('H') => self.move_selected_task(-1),
            KeyCode::Char('>') | KeyCode::Char('L') => self.move_selected_task(1),
            KeyCode::Char('n') => self.open_new_task(),
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit_task(),
            KeyCode::Char('d') | KeyCode::Delete => self.open_delete_confirm(),
            KeyCode::Char('s') => self.toggle_sidebar(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('r') => {
                if let Err(err) = self.reload() {
                    self.set_error(err.to_string());
                } else {
                    self.set_info("reloaded".to_string());
                }
            }
            _ => {}
        }
        KeyOutcome::Continue
    }

    fn regroup(&mut self) {
        self.groups = self.context.groups(&self.tasks, self.repo.columns());
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let columns = self.groups.len();
        if columns == 0 {
            self.selected_column = 0;
            self.selected_row = 0;
            return;
        }
        self.selected_column = self.selected_column.min(columns - 1);
        let rows = self.groups.columns()[self.selected_column].tasks.len();
        self.selected_row = self.selected_row.min(rows.saturating_sub(1));
    }

    fn select_task(&mut self, id: TaskId) {
        for (column_index, column) in self.groups.columns().iter().enumerate() {
            if let Some(row) = column.tasks.iter().position(|task| task.id == id) {
                self.selected_column = column_index;
                self.selected_row = row;
                return;
            }
        }
    }

    fn move_column(&mut self, delta: isize) {
        let columns = self.groups.len();
        if columns == 0 {
            return;
        }
        let next = (self.selected_column as isize + delta).clamp(0, columns as isize - 1);
        self.selected_column = next as usize;
        self.clamp_selection();
    }

    fn move_row(&mut self, delta: isize) {
        let Some(column) = self.groups.columns().get(self.selected_column) else {
            return;
        };
        if column.tasks.is_empty() {
            return;
        }
        let last = column.tasks.len() as isize - 1;
        self.selected_row = (self.selected_row as isize + delta).clamp(0, last) as usize;
    }

    fn cycle_board(&mut self, delta: isize) {
        let Some(board) = self.context.cycle(delta).map(str::to_string) else {
            self.set_info("no boards yet; press n to add a task".to_string());
            return;
        };
        if let Err(err) = self.prefs.set_active_board(&board) {
            self.set_error(err.to_string());
        }
        self.selected_column = 0;
        self.selected_row = 0;
        self.regroup();
    }

    /// Move the selected task one configured column left or right.
    fn move_selected_task(&mut self, delta: isize) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id;
        let statuses = self.repo.columns();
        // A status outside the configured columns re-enters at the first one.
        let target = match statuses.iter().position(|status| *status == task.status) {
            Some(index) => index as isize + delta,
            None if delta > 0 => 0,
            None => return,
        };
        let Some(status) = usize::try_from(target)
            .ok()
            .and_then(|index| statuses.get(index))
            .cloned()
        else {
            return;
        };

        match self.repo.patch(id, TaskPatch::status(status.clone())) {
            Ok(_) => self.set_info(format!("#{id} moved to {}", self.column_title(&status))),
            Err(Error::NotFound(_)) => {
                tracing::warn!(id, "move target missing, nothing updated");
                self.set_info(format!("task #{id} no longer exists"));
            }
            Err(err) => self.set_error(err.to_string()),
        }
        self.refresh_and_select(Some(id));
    }

    fn open_new_task(&mut self) {
        self.editor = Some(EditorState::new_task(
            self.repo.columns().to_vec(),
            &self.default_status,
            self.context.active(),
        ));
    }

    fn open_edit_task(&mut self) {
        let Some(task) = self.selected_task().cloned() else {
            return;
        };
        self.editor = Some(EditorState::edit_task(self.repo.columns().to_vec(), &task));
    }

    fn open_delete_confirm(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        self.delete_confirm = Some(DeleteConfirmState {
            task_id: task.id,
            title: task.title.clone(),
        });
    }

    fn submit_editor(&mut self) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };

        let result = match editor.kind() {
            EditorKind::NewTask => editor
                .build_new()
                .map_err(Error::Validation)
                .and_then(|input| self.repo.create(input)),
            EditorKind::EditTask => {
                let Some(id) = editor.task_id() else {
                    return;
                };
                editor
                    .build_patch()
                    .map_err(Error::Validation)
                    .and_then(|patch| self.repo.patch(id, patch))
            }
        };

        match result {
            Ok(task) => {
                self.editor = None;
                if let Some(board) = task.board_name() {
                    if self.context.active() != Some(board) {
                        if let Err(err) = self.prefs.set_active_board(board) {
                            self.set_error(err.to_string());
                        }
                    }
                }
                self.set_info(format!("saved #{}", task.id));
                self.refresh_and_select(Some(task.id));
            }
            Err(Error::NotFound(id)) => {
                tracing::warn!(id, "edit target missing, nothing updated");
                self.editor = None;
                self.set_info(format!("task #{id} no longer exists"));
                self.refresh_and_select(None);
            }
            Err(err @ Error::Validation(_)) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.set_error(err.to_string());
                }
            }
            Err(err) => {
                self.editor = None;
                self.set_error(err.to_string());
            }
        }
    }

    fn delete_task(&mut self, id: TaskId) {
        match self.repo.remove(id) {
            Ok(true) => self.set_info(format!("deleted #{id}")),
            Ok(false) => self.set_info(format!("task #{id} was already gone")),
            Err(err) => self.set_error(err.to_string()),
        }
        self.refresh_and_select(None);
    }

    fn toggle_sidebar(&mut self) {
        let show = !self.show_sidebar;
        match self.prefs.set_show_sidebar(show) {
            Ok(()) => self.show_sidebar = show,
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn toggle_theme(&mut self) {
        let theme = self.theme.toggled();
        match self.prefs.set_theme(theme) {
            Ok(()) => self.theme = theme,
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn refresh_and_select(&mut self, id: Option<TaskId>) {
        if let Err(err) = self.reload() {
            self.set_error(err.to_string());
            return;
        }
        if let Some(id) = id {
            self.select_task(id);
        }
    }

    fn set_info(&mut self, message: String) {
        self.status_message = Some((StatusKind::Info, message));
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some((StatusKind::Error, message));
    }
}

pub fn run(session: Session) -> Result<()> {
    let columns = session.columns();
    let default_status = session.config.board.default_status.clone();
    let (ui_tx, ui_rx) = mpsc::channel();
    spawn_watch(session.dir.clone(), ui_tx);

    let mut app = AppState::new(session.repo, session.prefs, columns, default_status)?;
    run_terminal(&mut app, ui_rx)
}

fn run_terminal<S: KeyValueStore>(app: &mut AppState<S>, ui_rx: Receiver<UiMsg>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app, ui_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop<S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState<S>,
    ui_rx: Receiver<UiMsg>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        while let Ok(msg) = ui_rx.try_recv() {
            match msg {
                UiMsg::StoreChanged => {
                    if let Err(err) = app.reload() {
                        app.set_error(format!("load error: {err}"));
                    }
                }
                UiMsg::WatchError(err) => {
                    app.watch_error = Some(format!("watch error: {err}"));
                }
            }
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    match app.handle_key(key) {
                        KeyOutcome::Quit => break,
                        KeyOutcome::EditDescription => edit_description(terminal, app),
                        KeyOutcome::Continue => {}
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }
    }
    Ok(())
}

fn edit_description<S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState<S>,
) {
    let Some(editor) = app.editor.as_mut() else {
        return;
    };
    match edit_text_external(terminal, editor.description()) {
        Ok(text) => editor.set_description(text.trim_end_matches('\n').to_string()),
        Err(err) => editor.set_error(err),
    }
}

fn edit_text_external(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    text: &str,
) -> std::result::Result<String, String> {
    let mut temp = NamedTempFile::new()
        .map_err(|err| format!("failed to create temp file for editor: {err}"))?;
    temp.write_all(text.as_bytes())
        .map_err(|err| format!("failed to write description to temp file: {err}"))?;
    temp.flush()
        .map_err(|err| format!("failed to flush temp file: {err}"))?;
    let path = temp.path().to_path_buf();

    suspend_terminal(terminal).map_err(|err| format!("failed to suspend terminal: {err}"))?;
    let editor_result = launch_editor(&path);
    if let Err(err) = resume_terminal(terminal) {
        return Err(format!("failed to restore terminal: {err}"));
    }

    let status = editor_result?;
    if !status.success() {
        let detail = status
            .code()
            .map(|code| format!("exit code {code}"))
            .unwrap_or_else(|| "signal".to_string());
        return Err(format!("editor exited with {detail}"));
    }

    fs::read_to_string(&path).map_err(|err| format!("failed to read editor buffer: {err}"))
}

fn suspend_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}

fn resume_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    enable_raw_mode()?;
    terminal.clear()?;
    Ok(())
}

fn launch_editor(path: &std::path::Path) -> std::result::Result<std::process::ExitStatus, String> {
    let mut attempted: Vec<String> = Vec::new();
    for candidate in editor_candidates() {
        let parts: Vec<&str> = candidate.split_whitespace().collect();
        let Some((program, args)) = parts.split_first() else {
            continue;
        };
        attempted.push(program.to_string());
        match Command::new(program).args(args).arg(path).status() {
            Ok(status) => return Ok(status),
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(format!("failed to launch editor '{program}': {err}")),
        }
    }
    let tried = if attempted.is_empty() {
        "no editor candidates".to_string()
    } else {
        attempted.join(", ")
    };
    Err(format!("no editor found (tried {tried}); set $VISUAL or $EDITOR"))
}

fn editor_candidates() -> Vec<String> {
    let mut out: Vec<String> = ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .filter(|value| !value.trim().is_empty())
        .collect();
    out.push("vi".to_string());
    out
}

/// Reload the board whenever another process rewrites the store.
fn spawn_watch(dir: PathBuf, ui_tx: Sender<UiMsg>) {
    if !dir.exists() {
        return;
    }

    thread::spawn(move || {
        let (event_tx, event_rx) = mpsc::channel();
        let watcher: notify::Result<RecommendedWatcher> = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        });

        let mut watcher = match watcher {
            Ok(watcher) => watcher,
            Err(err) => {
                let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
                return;
            }
        };
        if let Err(err) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
            let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
            return;
        }

        let debounce = Duration::from_millis(WATCH_DEBOUNCE_MS);
        let mut pending: Option<Instant> = None;

        loop {
            let timeout = pending
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(Duration::from_secs(3600));
            match event_rx.recv_timeout(timeout) {
                Ok(Ok(_)) => {
                    pending = Some(Instant::now() + debounce);
                }
                Ok(Err(err)) => {
                    let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if pending.take().is_some() && ui_tx.send(UiMsg::StoreChanged).is_err() {
                        break;
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    });
}
