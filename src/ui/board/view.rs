use chrono::{DateTime, Utc};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::types::{Task, TaskPriority, TaskStatus};

use super::app::{AppState, DeleteConfirmState, ProjectPicker, StatusKind};
use super::editor::{EditorState, ListPicker, TextPrompt};

const PRIORITY_WIDTH: usize = 6;
const ROWS_PER_CARD: usize = 3;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_DETAIL: Color = Color::Rgb(180, 156, 92);
const COLOR_MAGENTA: Color = Color::Rgb(214, 140, 230);

pub fn render(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);
    let header = chunks[0];
    let main = chunks[1];
    let footer = chunks[2];

    render_header(frame, app, header);
    render_board(frame, app, main);
    render_footer(frame, app, footer);

    if app.show_detail {
        render_detail_overlay(frame, app, area);
    }
    if let Some(editor) = app.editor.as_ref() {
        render_editor_modal(frame, area, editor);
    }
    if let Some(state) = app.status_change.as_ref() {
        render_status_modal(frame, area, &state.picker);
    }
    if let Some(state) = app.priority_change.as_ref() {
        render_priority_modal(frame, area, &state.picker);
    }
    if let Some(state) = app.comment_prompt.as_ref() {
        render_prompt_modal(frame, area, &state.prompt);
    }
    if let Some(state) = app.delete_confirm.as_ref() {
        render_delete_confirm_modal(frame, area, state);
    }
    if let Some(picker) = app.project_picker.as_ref() {
        render_project_picker_modal(frame, area, picker);
    }
}

fn render_header(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = Vec::new();
    let project_label = app
        .project
        .as_ref()
        .map(|project| project.name.clone())
        .unwrap_or_else(|| "no project".to_string());
    spans.push(Span::styled(
        project_label,
        Style::default()
            .fg(COLOR_ACCENT)
            .add_modifier(Modifier::BOLD),
    ));
    if app.filter_active || !app.filter.is_empty() {
        let filter_label = if app.filter_active {
            format!("filter: {}_", app.filter)
        } else {
            format!("filter: {}", app.filter)
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(filter_label, Style::default().fg(COLOR_INFO)));
    }
    if let Some(task_id) = app.drag.dragging_task() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("moving {task_id}"),
            Style::default()
                .fg(COLOR_WARNING)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(COLOR_BG_MUTED)),
    );
    frame.render_widget(widget, area);
}

fn render_board(frame: &mut Frame, app: &AppState, area: Rect) {
    if app.project.is_none() {
        let widget = Paragraph::new("").block(Block::default());
        frame.render_widget(widget, area);
        return;
    }
    if !app.loaded_once {
        let widget = Paragraph::new(Line::from(Span::styled(
            "Loading tasks...",
            Style::default().fg(COLOR_MUTED),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(widget, area);
        return;
    }

    let board = if let Some(error) = app.load_error.as_deref() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)].as_ref())
            .split(area);
        let banner = Paragraph::new(vec![
            Line::from(Span::styled(
                "Failed to load tasks (r to retry)",
                Style::default()
                    .fg(COLOR_ERROR)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                truncate_text(error, area.width.saturating_sub(2) as usize),
                Style::default().fg(COLOR_MUTED),
            )),
        ]);
        frame.render_widget(banner, chunks[0]);
        chunks[1]
    } else {
        area
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ]
            .as_ref(),
        )
        .split(board);
    for (idx, status) in TaskStatus::COLUMNS.into_iter().enumerate() {
        render_column(frame, app, status, columns[idx]);
    }
}

fn render_column(frame: &mut Frame, app: &AppState, status: TaskStatus, area: Rect) {
    let indices = app.columns.tasks_in(status);
    let content_width = area.width.saturating_sub(2) as usize;
    let is_hover = app.drag.is_hover_target(status);
    let is_cursor_column = app.cursor.status() == status;

    let mut lines: Vec<Line<'static>> = Vec::new();
    if is_hover {
        lines.push(Line::from(Span::styled(
            pad_text_center("[ drop here ]", content_width),
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        )));
    }

    if indices.is_empty() {
        if !is_hover {
            lines.push(Line::from(Span::styled(
                "No tasks",
                Style::default().fg(COLOR_MUTED_DARK),
            )));
        }
    } else {
        let capacity = ((area.height.saturating_sub(2) as usize)
            .saturating_sub(lines.len())
            / ROWS_PER_CARD)
            .max(1);
        let selected_pos = if is_cursor_column {
            Some(app.cursor.row.min(indices.len().saturating_sub(1)))
        } else {
            None
        };
        let (start, end) = list_window(indices.len(), selected_pos, capacity);
        for pos in start..end {
            if let Some(task) = indices.get(pos).and_then(|idx| app.tasks.get(*idx)) {
                let selected = selected_pos == Some(pos) && !app.filter_active;
                let dragging = app.drag.is_dragging_task(&task.id);
                lines.extend(card_lines(task, selected, dragging, content_width));
                lines.push(Line::from(""));
            }
        }
    }

    let (fg, _) = status_colors(status);
    let border_style = if is_hover {
        Style::default()
            .fg(COLOR_ACCENT)
            .add_modifier(Modifier::BOLD)
    } else if is_cursor_column {
        Style::default().fg(fg)
    } else {
        Style::default().fg(COLOR_BORDER)
    };
    let title = format!("{} ({})", status.label(), indices.len());
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn card_lines(task: &Task, selected: bool, dragging: bool, width: usize) -> Vec<Line<'static>> {
    let tag_text = pad_text(task.priority.as_str(), PRIORITY_WIDTH);
    let title_width = width.saturating_sub(PRIORITY_WIDTH + 1);
    let title_text = truncate_text(&task.title, title_width);

    let assignee = task
        .assignee_email
        .as_deref()
        .filter(|value| !value.trim().is_empty());
    let assignee_style = if assignee.is_some() {
        Style::default().fg(COLOR_MUTED)
    } else {
        Style::default().fg(COLOR_MUTED_DARK)
    };
    let mut meta = assignee.unwrap_or("unassigned").to_string();
    if task.comment_count > 0 {
        meta.push_str(&format!("  {}c", task.comment_count));
    }
    let meta_text = truncate_text(&meta, title_width);

    let mut first = vec![
        Span::styled(
            tag_text,
            Style::default()
                .fg(priority_color(task.priority))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(title_text, Style::default().fg(COLOR_TEXT)),
    ];
    let mut second = vec![
        Span::raw(" ".repeat(PRIORITY_WIDTH + 1)),
        Span::styled(meta_text, assignee_style),
    ];

    if dragging {
        for span in first.iter_mut().chain(second.iter_mut()) {
            span.style = span.style.add_modifier(Modifier::DIM);
        }
    }
    if selected {
        for span in first.iter_mut().chain(second.iter_mut()) {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
    }

    vec![Line::from(first), Line::from(second)]
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let hint = app.footer_hint();
    let hint_span = Span::styled(hint, Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status, status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let counts_line = Line::from(Span::styled(
        app.board_summary(),
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![line, counts_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER)),
        );
    frame.render_widget(widget, area);
}

fn render_detail_overlay(frame: &mut Frame, app: &AppState, area: Rect) {
    let width = area.width.saturating_sub(8).min(84);
    let height = area.height.saturating_sub(4).max(10);
    let modal = centered_rect(width, height, area);
    frame.render_widget(Clear, modal);

    let content_width = modal.width.saturating_sub(2) as usize;
    let lines = build_detail_lines(app, content_width);
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Details")
                .border_style(Style::default().fg(COLOR_BORDER_DETAIL)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, modal);
}

fn build_detail_lines(app: &AppState, width: usize) -> Vec<Line<'static>> {
    let Some(task) = app.selected_task() else {
        return vec![Line::from("No task selected")];
    };

    let mut lines: Vec<Line<'static>> = Vec::new();
    lines.push(Line::from(vec![
        Span::styled("# ", Style::default().fg(COLOR_MUTED_DARK)),
        Span::styled(
            truncate_text(&task.title, width.saturating_sub(2)),
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(vec![
        label_span("Status: "),
        Span::styled(
            task.status.label().to_string(),
            status_fg(task.status).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        label_span("Priority: "),
        Span::styled(
            task.priority.label().to_string(),
            Style::default()
                .fg(priority_color(task.priority))
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    let assignee = task
        .assignee_email
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or("unassigned");
    lines.push(Line::from(vec![
        label_span("Assignee: "),
        Span::styled(assignee.to_string(), Style::default().fg(COLOR_INFO)),
    ]));
    if let Some(due) = task.due_date {
        lines.push(Line::from(vec![
            label_span("Due: "),
            Span::styled(
                due.format("%Y-%m-%d").to_string(),
                Style::default().fg(COLOR_WARNING),
            ),
        ]));
    }
    let mut stamp_spans = vec![
        label_span("Created: "),
        Span::styled(
            format_timestamp(task.created_at),
            Style::default().fg(COLOR_WARNING),
        ),
    ];
    if let Some(updated) = task.updated_at {
        stamp_spans.push(Span::raw("  "));
        stamp_spans.push(label_span("Updated: "));
        stamp_spans.push(Span::styled(
            format_timestamp(updated),
            Style::default().fg(COLOR_WARNING),
        ));
    }
    lines.push(Line::from(stamp_spans));
    lines.push(Line::from(""));

    lines.push(section_header("## Description"));
    let description = task.description.trim_end();
    if description.trim().is_empty() {
        lines.push(Line::from(Span::styled(
            "No description.",
            Style::default().fg(COLOR_MUTED_DARK),
        )));
    } else {
        for line in description.lines() {
            lines.push(Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(COLOR_TEXT),
            )));
        }
    }

    lines.push(Line::from(""));
    match app.comments_for(&task.id) {
        Some(comments) => {
            lines.push(Line::from(Span::styled(
                format!("## Comments: {}", comments.len()),
                Style::default()
                    .fg(COLOR_MAGENTA)
                    .add_modifier(Modifier::BOLD),
            )));
            if comments.is_empty() {
                lines.push(Line::from(Span::styled(
                    "None",
                    Style::default().fg(COLOR_MUTED_DARK),
                )));
            }
            for comment in comments {
                lines.push(Line::from(vec![
                    Span::styled("- ", Style::default().fg(COLOR_MUTED_DARK)),
                    Span::styled(
                        format_timestamp(comment.created_at),
                        Style::default().fg(COLOR_WARNING),
                    ),
                    Span::raw(" "),
                    Span::styled(
                        comment.author_email.clone(),
                        Style::default().fg(COLOR_MUTED).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(": ", Style::default().fg(COLOR_MUTED_DARK)),
                    Span::styled(comment.content.clone(), Style::default().fg(COLOR_TEXT)),
                ]));
            }
        }
        None => {
            let suffix = if app.comments_pending(&task.id) {
                " (loading...)"
            } else {
                ""
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("## Comments: {}", task.comment_count),
                    Style::default()
                        .fg(COLOR_MAGENTA)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(suffix, Style::default().fg(COLOR_MUTED_DARK)),
            ]));
        }
    }

    lines
}

fn render_editor_modal(frame: &mut Frame, area: Rect, editor: &EditorState) {
    let width = area.width.saturating_sub(8).min(72);
    let height = 14u16.min(area.height.saturating_sub(4).max(10));
    let modal = centered_rect(width, height, area);
    frame.render_widget(Clear, modal);

    let content_width = modal.width.saturating_sub(2) as usize;
    let title = match editor.kind() {
        super::editor::EditorKind::NewTask => "New Task",
        super::editor::EditorKind::EditTask => "Edit Task",
    };
    let lines = if editor.confirming() {
        build_confirm_lines(editor, content_width)
    } else {
        build_editor_lines(editor, content_width)
    };
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(COLOR_BORDER_DETAIL)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, modal);
}

fn build_editor_lines(editor: &EditorState, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, field) in editor.fields().iter().enumerate() {
        let is_active = idx == editor.active_index();
        let label = format!("{:<12}", field.label);
        let mut value = field.value.clone();
        let placeholder = if value.trim().is_empty() {
            if field.required {
                Some("<required>".to_string())
            } else {
                Some("(optional)".to_string())
            }
        } else {
            None
        };
        let value_style = if placeholder.is_some() {
            Style::default().fg(COLOR_MUTED)
        } else {
            Style::default().fg(COLOR_TEXT)
        };
        if let Some(place) = placeholder {
            value = place;
        }
        if is_active {
            value.push('_');
        }
        let value = truncate_text(&value, width.saturating_sub(14));
        let mut spans = vec![
            Span::styled(label, Style::default().fg(COLOR_TEXT)),
            Span::raw(" "),
            Span::styled(value, value_style),
        ];
        if is_active {
            for span in &mut spans {
                span.style = span.style.add_modifier(Modifier::REVERSED);
            }
        }
        lines.push(Line::from(spans));
    }

    if let Some(error) = editor.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )));
    }
    lines
}

fn build_confirm_lines(editor: &EditorState, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    lines.push(Line::from(Span::styled(
        "Confirm task details",
        Style::default()
            .fg(COLOR_WARNING)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    if let Ok(submit) = editor.build_submit() {
        lines.push(Line::from(vec![
            label_span("Title: "),
            Span::styled(
                truncate_text(&submit.title, width.saturating_sub(8)),
                Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(vec![
            label_span("Priority: "),
            Span::styled(
                submit.priority.label().to_string(),
                Style::default().fg(priority_color(submit.priority)),
            ),
        ]));
        let assignee = submit
            .assignee_email
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or("(none)");
        lines.push(Line::from(vec![
            label_span("Assignee: "),
            Span::styled(assignee.to_string(), Style::default().fg(COLOR_INFO)),
        ]));
        let due = submit
            .due_date
            .map(|value| value.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "(none)".to_string());
        lines.push(Line::from(vec![
            label_span("Due: "),
            Span::styled(due, Style::default().fg(COLOR_WARNING)),
        ]));
        if submit.description.trim().is_empty() {
            lines.push(Line::from(vec![
                label_span("Description: "),
                Span::styled("(none)".to_string(), Style::default().fg(COLOR_MUTED_DARK)),
            ]));
        } else {
            let preview = submit.description.replace('\n', " ");
            lines.push(Line::from(vec![
                label_span("Description: "),
                Span::styled(
                    truncate_text(&preview, width.saturating_sub(14)),
                    Style::default().fg(COLOR_TEXT),
                ),
            ]));
        }
    }

    if let Some(error) = editor.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "y/enter save  e edit  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));
    lines
}

fn render_status_modal(frame: &mut Frame, area: Rect, picker: &ListPicker<TaskStatus>) {
    let width = 26u16.min(area.width.saturating_sub(6));
    let height = (picker.options().len() as u16 + 4).min(area.height.saturating_sub(4));
    let modal = centered_rect(width, height, area);
    frame.render_widget(Clear, modal);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, option) in picker.options().iter().enumerate() {
        let mut span = Span::styled(
            option.label().to_string(),
            status_fg(*option).add_modifier(Modifier::BOLD),
        );
        if idx == picker.selected_index() {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(span));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "enter apply  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn render_priority_modal(frame: &mut Frame, area: Rect, picker: &ListPicker<TaskPriority>) {
    let width = 22u16.min(area.width.saturating_sub(6));
    let height = (picker.options().len() as u16 + 4).min(area.height.saturating_sub(4));
    let modal = centered_rect(width, height, area);
    frame.render_widget(Clear, modal);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, option) in picker.options().iter().enumerate() {
        let mut span = Span::styled(
            option.label().to_string(),
            Style::default()
                .fg(priority_color(*option))
                .add_modifier(Modifier::BOLD),
        );
        if idx == picker.selected_index() {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(span));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "enter apply  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Priority"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn render_prompt_modal(frame: &mut Frame, area: Rect, prompt: &TextPrompt) {
    let width = area.width.saturating_sub(8).min(64);
    let height = 7u16.min(area.height.saturating_sub(4));
    let modal = centered_rect(width, height, area);
    frame.render_widget(Clear, modal);

    let content_width = modal.width.saturating_sub(2) as usize;
    let value = format!("{}_", prompt.value());
    let lines = vec![
        Line::from(Span::styled(
            truncate_text(&value, content_width),
            Style::default().fg(COLOR_TEXT),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "enter save  esc cancel",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(prompt.label())
                .border_style(Style::default().fg(COLOR_BORDER_DETAIL)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, modal);
}

fn render_delete_confirm_modal(frame: &mut Frame, area: Rect, state: &DeleteConfirmState) {
    let width = area.width.saturating_sub(8).min(64);
    let height = 8u16.min(area.height.saturating_sub(6).max(8));
    let modal = centered_rect(width, height, area);
    frame.render_widget(Clear, modal);

    let title_width = (width as usize).saturating_sub(9);
    let lines = vec![
        Line::from(Span::styled(
            "Delete task?",
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            label_span("Title: "),
            Span::styled(
                truncate_text(&state.title, title_width),
                Style::default().fg(COLOR_TEXT),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Comments on the task go with it.",
            Style::default().fg(COLOR_WARNING),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "y/enter confirm  esc cancel",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Delete Task"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn render_project_picker_modal(frame: &mut Frame, area: Rect, picker: &ProjectPicker) {
    let width = area.width.saturating_sub(6).min(72);
    let max_height = area.height.saturating_sub(6).max(8);
    let list_height = max_height.saturating_sub(4) as usize;
    let modal = centered_rect(width, max_height, area);
    frame.render_widget(Clear, modal);

    let content_width = modal.width.saturating_sub(2) as usize;
    let mut lines: Vec<Line<'static>> = Vec::new();
    let selected = Some(picker.selected);
    let (start, end) = list_window(picker.projects.len(), selected, list_height.max(1));
    for pos in start..end {
        if let Some(project) = picker.projects.get(pos) {
            let counts = format!(
                "{}/{}",
                project.completed_task_count, project.task_count
            );
            let name_width = content_width.saturating_sub(counts.len() + 3);
            let mut spans = vec![
                Span::styled(
                    truncate_text(&project.name, name_width),
                    Style::default().fg(COLOR_TEXT),
                ),
                Span::raw("  "),
                Span::styled(counts, Style::default().fg(COLOR_SUCCESS)),
            ];
            if selected == Some(pos) {
                for span in &mut spans {
                    span.style = span.style.add_modifier(Modifier::REVERSED);
                }
            }
            lines.push(Line::from(spans));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "j/k move  enter open  esc quit",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Select Project")
                .border_style(Style::default().fg(COLOR_BORDER)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn status_colors(status: TaskStatus) -> (Color, Color) {
    match status {
        TaskStatus::Todo => (Color::Rgb(80, 250, 123), Color::Rgb(26, 61, 42)),
        TaskStatus::InProgress => (Color::Rgb(139, 233, 253), Color::Rgb(26, 51, 68)),
        TaskStatus::Done => (Color::Rgb(98, 114, 164), Color::Rgb(42, 42, 61)),
        TaskStatus::Blocked => (COLOR_ERROR, Color::Rgb(68, 32, 32)),
    }
}

fn status_fg(status: TaskStatus) -> Style {
    let (fg, _) = status_colors(status);
    Style::default().fg(fg)
}

fn priority_color(priority: TaskPriority) -> Color {
    match priority {
        TaskPriority::Urgent => Color::Rgb(255, 87, 87),
        TaskPriority::High => Color::Rgb(255, 147, 112),
        TaskPriority::Medium => COLOR_WARNING,
        TaskPriority::Low => COLOR_ACCENT,
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn pad_text(value: &str, width: usize) -> String {
    let mut text = value.to_string();
    if text.len() > width {
        text = truncate_text(&text, width);
    }
    format!("{text:width$}")
}

fn pad_text_center(value: &str, width: usize) -> String {
    let mut text = value.to_string();
    if text.len() > width {
        text = truncate_text(&text, width);
    }
    let len = text.chars().count();
    if len >= width {
        return text;
    }
    let total_pad = width - len;
    let left = total_pad / 2;
    let right = total_pad - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

fn label_span(label: &str) -> Span<'static> {
    Span::styled(label.to_string(), Style::default().fg(COLOR_MUTED_DARK))
}

fn section_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(COLOR_MAGENTA)
            .add_modifier(Modifier::BOLD),
    ))
}
