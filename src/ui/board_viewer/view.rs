use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::kv::KeyValueStore;
use crate::prefs::Theme;
use crate::task::Task;

use super::app::{AppState, DeleteConfirmState, StatusKind};
use super::editor::{EditorFieldId, EditorKind, EditorState};

const SIDEBAR_WIDTH: u16 = 26;
const HELP_KEY_WIDTH: usize = 10;

#[derive(Clone, Copy)]
struct Palette {
    bg: Color,
    panel: Color,
    text: Color,
    muted: Color,
    accent: Color,
    border: Color,
    selected_bg: Color,
    info: Color,
    error: Color,
}

const DARK: Palette = Palette {
    bg: Color::Rgb(32, 33, 44),
    panel: Color::Rgb(43, 44, 55),
    text: Color::Rgb(234, 236, 239),
    muted: Color::Rgb(130, 143, 163),
    accent: Color::Rgb(99, 95, 199),
    border: Color::Rgb(62, 63, 78),
    selected_bg: Color::Rgb(62, 63, 78),
    info: Color::Rgb(116, 198, 219),
    error: Color::Rgb(234, 85, 85),
};

const LIGHT: Palette = Palette {
    bg: Color::Rgb(244, 247, 253),
    panel: Color::Rgb(255, 255, 255),
    text: Color::Rgb(0, 1, 18),
    muted: Color::Rgb(130, 143, 163),
    accent: Color::Rgb(99, 95, 199),
    border: Color::Rgb(228, 235, 250),
    selected_bg: Color::Rgb(228, 235, 250),
    info: Color::Rgb(32, 120, 160),
    error: Color::Rgb(200, 50, 50),
};

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => DARK,
        Theme::Light => LIGHT,
    }
}

pub fn render<S: KeyValueStore>(frame: &mut Frame, app: &AppState<S>) {
    let area = frame.size();
    let colors = palette(app.theme);
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);
    let header = chunks[0];
    let body = chunks[1];
    let footer = chunks[2];

    render_header(frame, app, colors, header);

    let board_area = if app.show_sidebar {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(body);
        render_sidebar(frame, app, colors, chunks[0]);
        chunks[1]
    } else {
        body
    };
    render_columns(frame, app, colors, board_area);
    render_footer(frame, app, colors, footer);

    if let Some(editor) = app.editor.as_ref() {
        render_editor_modal(frame, colors, area, editor);
    }
    if let Some(state) = app.delete_confirm.as_ref() {
        render_delete_confirm_modal(frame, colors, area, state);
    }
    if app.show_help {
        render_help_modal(frame, colors, area);
    }
}

fn render_header<S: KeyValueStore>(frame: &mut Frame, app: &AppState<S>, colors: Palette, area: Rect) {
    let board = app.context.active().unwrap_or("No boards");
    let line = Line::from(vec![
        Span::styled(
            " kanban ",
            Style::default()
                .fg(colors.panel)
                .bg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            board.to_string(),
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_sidebar<S: KeyValueStore>(
    frame: &mut Frame,
    app: &AppState<S>,
    colors: Palette,
    area: Rect,
) {
    let title = format!(" ALL BOARDS ({}) ", app.context.boards.len());
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(colors.muted)))
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(colors.border))
        .style(Style::default().bg(colors.panel));

    let mut lines: Vec<Line<'static>> = app
        .context
        .boards
        .iter()
        .map(|board| {
            if app.context.active() == Some(board.as_str()) {
                Line::from(Span::styled(
                    format!(" ▌{board}"),
                    Style::default()
                        .fg(colors.accent)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(
                    format!("  {board}"),
                    Style::default().fg(colors.muted),
                ))
            }
        })
        .collect();

    lines.push(Line::from(""));
    let theme_label = match app.theme {
        Theme::Dark => "dark",
        Theme::Light => "light",
    };
    lines.push(Line::from(vec![
        Span::styled("  theme ", Style::default().fg(colors.muted)),
        Span::styled(theme_label, Style::default().fg(colors.text)),
        Span::styled(" (t)", Style::default().fg(colors.muted)),
    ]));
    lines.push(Line::from(Span::styled(
        "  hide sidebar (s)",
        Style::default().fg(colors.muted),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_columns<S: KeyValueStore>(
    frame: &mut Frame,
    app: &AppState<S>,
    colors: Palette,
    area: Rect,
) {
    let columns = app.groups.columns();
    if columns.is_empty() {
        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "This board is empty. Press n to create a task.",
                Style::default().fg(colors.muted),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(message, area);
        return;
    }

    let constraints: Vec<Constraint> = columns
        .iter()
        .map(|_| Constraint::Ratio(1, columns.len() as u32))
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (index, (column, chunk)) in columns.iter().zip(chunks.iter()).enumerate() {
        let focused = index == app.selected_column;
        let title = format!(
            " {} ({}) ",
            app.column_title(&column.status),
            column.tasks.len()
        );
        let border = if focused { colors.accent } else { colors.border };
        let block = Block::default()
            .title(Span::styled(title, Style::default().fg(colors.muted)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        let width = chunk.width.saturating_sub(4) as usize;
        let items: Vec<ListItem<'static>> = column
            .tasks
            .iter()
            .map(|task| task_item(task, width, colors))
            .collect();
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(colors.selected_bg)
                .add_modifier(Modifier::BOLD),
        );

        let mut state = ListState::default();
        if focused && !column.tasks.is_empty() {
            state.select(Some(app.selected_row));
        }
        frame.render_stateful_widget(list, *chunk, &mut state);
    }
}

fn task_item(task: &Task, width: usize, colors: Palette) -> ListItem<'static> {
    let mut lines = vec![Line::from(Span::styled(
        truncate_text(&task.title, width),
        Style::default().fg(colors.text),
    ))];
    let summary = task.description.lines().next().unwrap_or("").trim();
    if !summary.is_empty() {
        lines.push(Line::from(Span::styled(
            truncate_text(summary, width),
            Style::default().fg(colors.muted),
        )));
    }
    lines.push(Line::from(""));
    ListItem::new(lines)
}

fn render_footer<S: KeyValueStore>(frame: &mut Frame, app: &AppState<S>, colors: Palette, area: Rect) {
    let line = match app.status_line() {
        Some((StatusKind::Error, message)) => Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(colors.error),
        )),
        Some((StatusKind::Info, message)) => Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(colors.info),
        )),
        None => Line::from(Span::styled(
            " n new  e edit  d delete  </> move  [/] board  ? help  q quit",
            Style::default().fg(colors.muted),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_editor_modal(frame: &mut Frame, colors: Palette, area: Rect, editor: &EditorState) {
    let width = area.width.saturating_sub(8).min(70);
    let height = (editor.fields().len() as u16 * 2 + 6).min(area.height.saturating_sub(2));
    let modal = centered_rect(width, height, area);
    frame.render_widget(Clear, modal);

    let title = match editor.kind() {
        EditorKind::NewTask => " Add New Task ",
        EditorKind::EditTask => " Edit Task ",
    };
    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.accent))
        .style(Style::default().bg(colors.panel));

    let value_width = (width as usize).saturating_sub(18);
    let mut lines: Vec<Line<'static>> = Vec::new();
    for (index, field) in editor.fields().iter().enumerate() {
        let active = index == editor.active_index();
        let label_style = if active {
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.muted)
        };
        let mut value = field.value.replace('\n', " ");
        if field.id == EditorFieldId::Status {
            value = format!("‹ {value} ›");
        } else if active {
            value.push('_');
        }
        lines.push(Line::from(vec![
            Span::styled(format!("{:<13}", field.label), label_style),
            Span::styled(
                truncate_text(&value, value_width),
                Style::default().fg(colors.text),
            ),
        ]));
        lines.push(Line::from(""));
    }

    let footer = if let Some(err) = editor.error() {
        Span::styled(err.to_string(), Style::default().fg(colors.error))
    } else if editor.confirming() {
        Span::styled(
            "Save? y/Enter save, e keep editing, Esc discard",
            Style::default().fg(colors.info),
        )
    } else {
        Span::styled(
            "Tab next field, ←/→ status, Ctrl-E description in $EDITOR, Esc cancel",
            Style::default().fg(colors.muted),
        )
    };
    lines.push(Line::from(footer));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        modal,
    );
}

fn render_delete_confirm_modal(
    frame: &mut Frame,
    colors: Palette,
    area: Rect,
    state: &DeleteConfirmState,
) {
    let width = area.width.saturating_sub(8).min(60);
    let modal = centered_rect(width, 8, area);
    frame.render_widget(Clear, modal);

    let title_width = (width as usize).saturating_sub(6);
    let lines = vec![
        Line::from(Span::styled(
            "Delete this task?",
            Style::default()
                .fg(colors.error)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            truncate_text(&format!("#{} {}", state.task_id, state.title), title_width),
            Style::default().fg(colors.text),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "y/Enter delete, n/Esc cancel",
            Style::default().fg(colors.muted),
        )),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.error))
        .style(Style::default().bg(colors.panel));
    frame.render_widget(Paragraph::new(lines).block(block), modal);
}

fn render_help_modal(frame: &mut Frame, colors: Palette, area: Rect) {
    let entries = [
        ("h/l ←/→", "select column"),
        ("j/k ↑/↓", "select task"),
        ("[ / ]", "previous / next board"),
        ("< / >", "move task to previous / next column"),
        ("n", "new task"),
        ("e Enter", "edit task"),
        ("d", "delete task"),
        ("s", "show / hide sidebar"),
        ("t", "toggle light theme"),
        ("r", "reload"),
        ("q Esc", "quit"),
    ];
    let width = area.width.saturating_sub(8).min(56);
    let height = entries.len() as u16 + 4;
    let modal = centered_rect(width, height, area);
    frame.render_widget(Clear, modal);

    let lines: Vec<Line<'static>> = entries
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(
                    format!("{key:<HELP_KEY_WIDTH$}"),
                    Style::default().fg(colors.accent),
                ),
                Span::styled(action.to_string(), Style::default().fg(colors.text)),
            ])
        })
        .collect();
    let block = Block::default()
        .title(Span::styled(" Keys ", Style::default().fg(colors.text)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.accent))
        .style(Style::default().bg(colors.panel));
    frame.render_widget(Paragraph::new(lines).block(block), modal);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn truncate_text(value: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
