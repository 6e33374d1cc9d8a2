use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::client::Gateway;
use crate::error::{Error, Result};
use crate::types::{Project, ProjectRef, Task, TaskChanges, TaskComment, TaskStatus};

use super::actions::{self, ActionOutcome};
use super::drag::{self, DragPayload, DragState, DropOutcome, FetchSequencer};
use super::editor::{
    priority_picker, status_picker, EditorAction, EditorKind, EditorState, PickerAction,
    PriorityPicker, StatusPicker, TextPrompt,
};
use super::model::{self, BoardColumns, BoardCursor};
use super::view;

const EVENT_POLL_MS: u64 = 120;

enum LoadRequest {
    Reload { seq: u64, project_id: String },
    Comments { task_id: String },
}

enum UiMsg {
    TasksLoaded { seq: u64, tasks: Vec<Task> },
    TasksFailed { seq: u64, error: String },
    CommentsLoaded { task_id: String, comments: Vec<TaskComment> },
    CommentsFailed { task_id: String, error: String },
    UpdateFailed(String),
}

#[derive(Clone, Copy)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

/// Which edge the hover cursor stepped off while dragging. The drag state
/// itself stays a pure tagged variant; the physical cursor position is an
/// input concern.
#[derive(Clone, Copy, PartialEq, Eq)]
enum OffEdge {
    Left,
    Right,
}

pub(crate) struct DeleteConfirmState {
    pub(crate) task_id: String,
    pub(crate) title: String,
}

pub(crate) struct StatusChangeState {
    pub(crate) picker: StatusPicker,
    pub(crate) task_id: String,
}

pub(crate) struct PriorityChangeState {
    pub(crate) picker: PriorityPicker,
    pub(crate) task_id: String,
}

pub(crate) struct CommentPromptState {
    pub(crate) prompt: TextPrompt,
    pub(crate) task_id: String,
}

pub(crate) struct ProjectPicker {
    pub(crate) projects: Vec<Project>,
    pub(crate) selected: usize,
}

impl ProjectPicker {
    fn new(projects: Vec<Project>) -> Self {
        Self {
            projects,
            selected: 0,
        }
    }

    pub(crate) fn selected_project(&self) -> Option<&Project> {
        self.projects.get(self.selected)
    }

    fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return PickerAction::Cancel,
            KeyCode::Enter => return PickerAction::Confirm,
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.projects.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            _ => {}
        }
        PickerAction::None
    }
}

pub struct AppState {
    pub(crate) tasks: Vec<Task>,
    pub(crate) columns: BoardColumns,
    pub(crate) cursor: BoardCursor,
    pub(crate) filter: String,
    pub(crate) filter_active: bool,
    pub(crate) drag: DragState,
    drag_transfer: Option<String>,
    drag_edge: Option<OffEdge>,
    fetch_seq: FetchSequencer,
    pub(crate) project: Option<ProjectRef>,
    pub(crate) project_picker: Option<ProjectPicker>,
    pub(crate) editor: Option<EditorState>,
    pub(crate) status_change: Option<StatusChangeState>,
    pub(crate) priority_change: Option<PriorityChangeState>,
    pub(crate) comment_prompt: Option<CommentPromptState>,
    pub(crate) delete_confirm: Option<DeleteConfirmState>,
    pub(crate) show_detail: bool,
    comment_cache: HashMap<String, Vec<TaskComment>>,
    pending_comments: HashSet<String>,
    pub(crate) loaded_once: bool,
    pub(crate) load_error: Option<String>,
    status_message: Option<String>,
    info_message: Option<String>,
    author_email: Option<String>,
    gateway: Arc<dyn Gateway>,
}

impl AppState {
    fn new(
        gateway: Arc<dyn Gateway>,
        project: Option<ProjectRef>,
        project_picker: Option<ProjectPicker>,
        author_email: Option<String>,
    ) -> Self {
        Self {
            tasks: Vec::new(),
            columns: BoardColumns::default(),
            cursor: BoardCursor::default(),
            filter: String::new(),
            filter_active: false,
            drag: DragState::Idle,
            drag_transfer: None,
            drag_edge: None,
            fetch_seq: FetchSequencer::new(),
            project,
            project_picker,
            editor: None,
            status_change: None,
            priority_change: None,
            comment_prompt: None,
            delete_confirm: None,
            show_detail: false,
            comment_cache: HashMap::new(),
            pending_comments: HashSet::new(),
            loaded_once: false,
            load_error: None,
            status_message: None,
            info_message: None,
            author_email,
            gateway,
        }
    }

    pub(crate) fn selected_task(&self) -> Option<&Task> {
        self.cursor.selected(&self.tasks, &self.columns)
    }

    pub(crate) fn comments_for(&self, task_id: &str) -> Option<&[TaskComment]> {
        self.comment_cache.get(task_id).map(Vec::as_slice)
    }

    pub(crate) fn comments_pending(&self, task_id: &str) -> bool {
        self.pending_comments.contains(task_id)
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        if let Some(message) = self.status_message.as_ref() {
            return Some((message.clone(), StatusKind::Error));
        }
        if let Some(info) = self.info_message.as_ref() {
            return Some((info.clone(), StatusKind::Info));
        }
        if !self.filter.is_empty() {
            return Some((format!("filter: {}", self.filter), StatusKind::Info));
        }
        None
    }

    pub(crate) fn footer_hint(&self) -> String {
        if self.project_picker.is_some() {
            return "j/k move  enter open board  esc quit".to_string();
        }
        if self.delete_confirm.is_some() {
            return "y confirm delete  esc cancel".to_string();
        }
        if self.status_change.is_some() || self.priority_change.is_some() {
            return "j/k move  enter apply  esc cancel".to_string();
        }
        if self.comment_prompt.is_some() {
            return "type comment  enter save  esc cancel".to_string();
        }
        if let Some(editor) = self.editor.as_ref() {
            if editor.confirming() {
                return "y/enter save  e edit  esc cancel".to_string();
            }
            return "tab next field  enter confirm  esc cancel".to_string();
        }
        if !self.drag.is_idle() {
            return "h/l choose column  enter drop  esc cancel".to_string();
        }
        if self.filter_active {
            return "type filter  enter done  esc clear".to_string();
        }
        if self.show_detail {
            return "c comment  e edit  d delete  esc close".to_string();
        }
        "arrows move  space grab  enter details  / filter  n new  s status  r reload  q quit"
            .to_string()
    }

    pub(crate) fn board_summary(&self) -> String {
        let mut segments = Vec::with_capacity(TaskStatus::COLUMNS.len());
        for status in TaskStatus::COLUMNS {
            let count = self
                .tasks
                .iter()
                .filter(|task| task.status == status)
                .count();
            segments.push(format!("{}: {count}", status.label()));
        }
        segments.join("  ")
    }

    fn rebuild_columns(&mut self, previous_id: Option<String>) {
        self.columns = BoardColumns::build(&self.tasks, &self.filter);
        match previous_id
            .as_deref()
            .and_then(|id| model::locate_task(&self.tasks, &self.columns, id))
        {
            Some(cursor) => self.cursor = cursor,
            None => self.cursor.clamp(&self.columns),
        }
    }

    fn request_reload(&mut self, req_tx: &Sender<LoadRequest>) {
        let Some(project) = self.project.as_ref() else {
            return;
        };
        let seq = self.fetch_seq.issue();
        let _ = req_tx.send(LoadRequest::Reload {
            seq,
            project_id: project.id.clone(),
        });
    }

    fn queue_comments(&mut self, req_tx: &Sender<LoadRequest>) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let task_id = task.id.clone();
        if self.comment_cache.contains_key(&task_id) || self.pending_comments.contains(&task_id) {
            return;
        }
        if req_tx
            .send(LoadRequest::Comments {
                task_id: task_id.clone(),
            })
            .is_ok()
        {
            self.pending_comments.insert(task_id);
        }
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some(message);
        self.info_message = None;
    }

    fn set_info(&mut self, message: String) {
        self.info_message = Some(message);
        self.status_message = None;
    }

    fn apply_outcome(&mut self, outcome: ActionOutcome, req_tx: &Sender<LoadRequest>) {
        if outcome.changed {
            self.request_reload(req_tx);
        }
        self.set_info(outcome.message);
    }

    /// Grab the selected card: the gesture starts on the card's own column.
    fn begin_drag(&mut self) {
        let Some(task) = self.selected_task() else {
            self.set_error("no task selected".to_string());
            return;
        };
        let payload = DragPayload::new(task.id.clone(), task.status);
        let status = task.status;
        match payload.encode() {
            Ok(encoded) => {
                self.drag.begin(payload.task_id.clone());
                self.drag.hover(status);
                self.drag_transfer = Some(encoded);
                self.drag_edge = None;
            }
            Err(err) => self.set_error(err.to_string()),
        }
    }

    /// Move the hover target one column; stepping off either edge clears it
    /// without ending the drag, stepping back in re-enters at that edge.
    fn drag_step(&mut self, delta: isize) {
        match self.drag.hover_target() {
            Some(target) => {
                let next = target.column_index() as isize + delta;
                if next < 0 {
                    self.drag.leave();
                    self.drag_edge = Some(OffEdge::Left);
                } else if next >= TaskStatus::COLUMNS.len() as isize {
                    self.drag.leave();
                    self.drag_edge = Some(OffEdge::Right);
                } else {
                    self.drag.hover(model::column_status(next as usize));
                }
            }
            None => match self.drag_edge {
                Some(OffEdge::Left) if delta > 0 => {
                    self.drag.hover(TaskStatus::COLUMNS[0]);
                    self.drag_edge = None;
                }
                Some(OffEdge::Right) if delta < 0 => {
                    self.drag
                        .hover(TaskStatus::COLUMNS[TaskStatus::COLUMNS.len() - 1]);
                    self.drag_edge = None;
                }
                _ => {}
            },
        }
    }

    fn end_drag(&mut self) {
        self.drag.end();
        self.drag_transfer = None;
        self.drag_edge = None;
    }
}

pub fn run(
    gateway: Arc<dyn Gateway>,
    organization_slug: &str,
    project_id: Option<&str>,
    author_email: Option<String>,
) -> Result<()> {
    // Resolve the project before the terminal takes over so failures print
    // as ordinary errors.
    let (project, picker) = match project_id {
        Some(id) => {
            let project = gateway.project(id)?;
            (
                Some(ProjectRef {
                    id: project.id,
                    name: project.name,
                    organization: None,
                }),
                None,
            )
        }
        None => {
            let projects = gateway.projects(organization_slug, None)?;
            if projects.is_empty() {
                return Err(Error::InvalidArgument(format!(
                    "organization {organization_slug} has no projects"
                )));
            }
            (None, Some(ProjectPicker::new(projects)))
        }
    };

    let (ui_tx, ui_rx) = mpsc::channel();
    let (req_tx, req_rx) = mpsc::channel();
    spawn_loader(gateway.clone(), req_rx, ui_tx.clone());

    let mut app = AppState::new(gateway, project, picker, author_email);
    if app.project.is_some() {
        app.request_reload(&req_tx);
    }

    run_terminal(&mut app, ui_rx, req_tx, ui_tx)
}

fn run_terminal(
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
    req_tx: Sender<LoadRequest>,
    ui_tx: Sender<UiMsg>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app, ui_rx, req_tx, ui_tx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
    req_tx: Sender<LoadRequest>,
    ui_tx: Sender<UiMsg>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        while let Ok(msg) = ui_rx.try_recv() {
            handle_ui_msg(app, msg, &req_tx);
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key, &req_tx, &ui_tx) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(..) => {
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_ui_msg(app: &mut AppState, msg: UiMsg, req_tx: &Sender<LoadRequest>) {
    match msg {
        UiMsg::TasksLoaded { seq, tasks } => {
            // A response issued before one already applied is stale.
            if !app.fetch_seq.admit(seq) {
                return;
            }
            let previous_id = app.selected_task().map(|task| task.id.clone());
            app.tasks = tasks;
            app.loaded_once = true;
            app.load_error = None;
            app.comment_cache.clear();
            app.pending_comments.clear();
            app.rebuild_columns(previous_id);
            if app.show_detail {
                app.queue_comments(req_tx);
            }
        }
        UiMsg::TasksFailed { seq, error } => {
            if !app.fetch_seq.admit(seq) {
                return;
            }
            app.loaded_once = true;
            app.load_error = Some(error);
        }
        UiMsg::CommentsLoaded { task_id, comments } => {
            app.pending_comments.remove(&task_id);
            app.comment_cache.insert(task_id, comments);
        }
        UiMsg::CommentsFailed { task_id, error } => {
            app.pending_comments.remove(&task_id);
            app.set_error(format!("comment error: {error}"));
        }
        UiMsg::UpdateFailed(error) => {
            app.set_error(format!("update error: {error}"));
        }
    }
}

fn handle_key(
    app: &mut AppState,
    key: KeyEvent,
    req_tx: &Sender<LoadRequest>,
    ui_tx: &Sender<UiMsg>,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if let Some(confirm) = app.delete_confirm.take() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                match actions::delete_task(&*app.gateway, &confirm.task_id) {
                    Ok(outcome) => {
                        app.show_detail = false;
                        app.apply_outcome(outcome, req_tx);
                    }
                    Err(err) => app.set_error(err.to_string()),
                }
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                app.set_info("cancelled".to_string());
            }
            _ => {
                app.delete_confirm = Some(confirm);
            }
        }
        return false;
    }

    if let Some(mut picker) = app.project_picker.take() {
        match picker.handle_key(key) {
            PickerAction::None => {
                app.project_picker = Some(picker);
            }
            PickerAction::Cancel => return true,
            PickerAction::Confirm => match picker.selected_project() {
                Some(project) => {
                    app.project = Some(ProjectRef {
                        id: project.id.clone(),
                        name: project.name.clone(),
                        organization: None,
                    });
                    app.request_reload(req_tx);
                }
                None => {
                    app.project_picker = Some(picker);
                }
            },
        }
        return false;
    }

    if let Some(mut state) = app.comment_prompt.take() {
        match state.prompt.handle_key(key) {
            EditorAction::None => {
                app.comment_prompt = Some(state);
            }
            EditorAction::Cancel => {
                app.set_info("cancelled".to_string());
            }
            EditorAction::Submit => {
                let Some(author) = app.author_email.clone() else {
                    app.set_error("set ui.author_email in the config to comment".to_string());
                    return false;
                };
                match actions::add_comment(&*app.gateway, &state.task_id, state.prompt.value(), &author)
                {
                    Ok(outcome) => {
                        app.comment_cache.remove(&state.task_id);
                        app.pending_comments.remove(&state.task_id);
                        app.queue_comments(req_tx);
                        app.apply_outcome(outcome, req_tx);
                    }
                    Err(err) => app.set_error(err.to_string()),
                }
            }
        }
        return false;
    }

    if let Some(mut editor) = app.editor.take() {
        let kind = editor.kind();
        let task_id = editor.task_id().map(|value| value.to_string());
        match editor.handle_key(key) {
            EditorAction::None => {
                app.editor = Some(editor);
            }
            EditorAction::Cancel => {
                app.set_info("cancelled".to_string());
            }
            EditorAction::Submit => match editor.build_submit() {
                Ok(fields) => {
                    let outcome = match kind {
                        EditorKind::NewTask => match app.project.as_ref() {
                            Some(project) => {
                                actions::create_task(&*app.gateway, &project.id, fields)
                            }
                            None => Err(Error::OperationFailed(
                                "no project selected".to_string(),
                            )),
                        },
                        EditorKind::EditTask => match task_id
                            .as_deref()
                            .and_then(|id| app.tasks.iter().find(|task| task.id == id))
                        {
                            Some(task) => {
                                actions::update_task_details(&*app.gateway, task, fields)
                            }
                            None => Err(Error::TaskNotFound(
                                task_id.unwrap_or_default(),
                            )),
                        },
                    };
                    match outcome {
                        Ok(outcome) => app.apply_outcome(outcome, req_tx),
                        Err(err) => {
                            editor.set_error(err.to_string());
                            app.editor = Some(editor);
                        }
                    }
                }
                Err(err) => {
                    editor.set_error(err);
                    app.editor = Some(editor);
                }
            },
        }
        return false;
    }

    if let Some(mut state) = app.status_change.take() {
        match state.picker.handle_key(key) {
            PickerAction::None => {
                app.status_change = Some(state);
            }
            PickerAction::Cancel => {}
            PickerAction::Confirm => {
                let selected = state.picker.selected();
                let current = app
                    .tasks
                    .iter()
                    .find(|task| task.id == state.task_id)
                    .map(|task| task.status);
                match current {
                    Some(current) => {
                        match actions::change_status(&*app.gateway, &state.task_id, current, selected)
                        {
                            Ok(outcome) => app.apply_outcome(outcome, req_tx),
                            Err(err) => app.set_error(err.to_string()),
                        }
                    }
                    None => app.set_error("task no longer on the board".to_string()),
                }
            }
        }
        return false;
    }

    if let Some(mut state) = app.priority_change.take() {
        match state.picker.handle_key(key) {
            PickerAction::None => {
                app.priority_change = Some(state);
            }
            PickerAction::Cancel => {}
            PickerAction::Confirm => {
                let selected = state.picker.selected();
                let current = app
                    .tasks
                    .iter()
                    .find(|task| task.id == state.task_id)
                    .map(|task| task.priority);
                match current {
                    Some(current) => {
                        match actions::change_priority(
                            &*app.gateway,
                            &state.task_id,
                            current,
                            selected,
                        ) {
                            Ok(outcome) => app.apply_outcome(outcome, req_tx),
                            Err(err) => app.set_error(err.to_string()),
                        }
                    }
                    None => app.set_error("task no longer on the board".to_string()),
                }
            }
        }
        return false;
    }

    if !app.drag.is_idle() {
        match key.code {
            KeyCode::Esc => app.end_drag(),
            KeyCode::Left | KeyCode::Char('h') => app.drag_step(-1),
            KeyCode::Right | KeyCode::Char('l') => app.drag_step(1),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('g') => {
                complete_drop(app, ui_tx);
            }
            _ => {}
        }
        return false;
    }

    if app.filter_active {
        match key.code {
            KeyCode::Esc => {
                app.filter.clear();
                app.filter_active = false;
            }
            KeyCode::Enter => app.filter_active = false,
            KeyCode::Backspace => {
                app.filter.pop();
            }
            KeyCode::Char(ch) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return false;
                }
                if !ch.is_control() {
                    app.filter.push(ch);
                }
            }
            _ => {}
        }
        let previous = app.selected_task().map(|task| task.id.clone());
        app.rebuild_columns(previous);
        return false;
    }

    if app.show_detail {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                app.show_detail = false;
            }
            KeyCode::Char('c') => open_comment_prompt(app),
            KeyCode::Char('e') => open_editor(app),
            KeyCode::Char('d') => open_delete_confirm(app),
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Up | KeyCode::Char('k') => {
            app.cursor.move_up();
            false
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.cursor.move_down(&app.columns);
            false
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.cursor.move_left(&app.columns);
            false
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.cursor.move_right(&app.columns);
            false
        }
        KeyCode::Char(' ') | KeyCode::Char('g') => {
            app.begin_drag();
            false
        }
        KeyCode::Enter => {
            if app.selected_task().is_some() {
                app.show_detail = true;
                app.queue_comments(req_tx);
            }
            false
        }
        KeyCode::Char('/') => {
            app.filter_active = true;
            false
        }
        KeyCode::Char('r') => {
            app.request_reload(req_tx);
            false
        }
        KeyCode::Char('n') => {
            if app.project.is_some() {
                app.editor = Some(EditorState::new_task());
            }
            false
        }
        KeyCode::Char('e') => {
            open_editor(app);
            false
        }
        KeyCode::Char('d') => {
            open_delete_confirm(app);
            false
        }
        KeyCode::Char('s') => {
            let Some(task) = app.selected_task() else {
                app.set_error("no task selected".to_string());
                return false;
            };
            app.status_change = Some(StatusChangeState {
                picker: status_picker(task.status),
                task_id: task.id.clone(),
            });
            false
        }
        KeyCode::Char('p') => {
            let Some(task) = app.selected_task() else {
                app.set_error("no task selected".to_string());
                return false;
            };
            app.priority_change = Some(PriorityChangeState {
                picker: priority_picker(task.priority),
                task_id: task.id.clone(),
            });
            false
        }
        KeyCode::Char('c') => {
            open_comment_prompt(app);
            false
        }
        _ => false,
    }
}

fn open_editor(app: &mut AppState) {
    let Some(task) = app.selected_task() else {
        app.set_error("no task selected".to_string());
        return;
    };
    app.editor = Some(EditorState::edit_task(task));
}

fn open_delete_confirm(app: &mut AppState) {
    let Some(task) = app.selected_task() else {
        app.set_error("no task selected".to_string());
        return;
    };
    app.delete_confirm = Some(DeleteConfirmState {
        task_id: task.id.clone(),
        title: task.title.clone(),
    });
}

fn open_comment_prompt(app: &mut AppState) {
    let Some(task) = app.selected_task() else {
        app.set_error("no task selected".to_string());
        return;
    };
    if app.author_email.is_none() {
        app.set_error("set ui.author_email in the config to comment".to_string());
        return;
    }
    app.comment_prompt = Some(CommentPromptState {
        prompt: TextPrompt::new("Comment"),
        task_id: task.id.clone(),
    });
}

/// Resolve the pending drop. The status update and the follow-up refetch run
/// on a worker thread so a new drag can start while they are in flight.
fn complete_drop(app: &mut AppState, ui_tx: &Sender<UiMsg>) {
    let Some(target) = app.drag.hover_target() else {
        return;
    };
    let Some(project) = app.project.clone() else {
        app.end_drag();
        return;
    };
    let transfer = app.drag_transfer.take();
    app.drag_edge = None;
    match drag::resolve_drop(&mut app.drag, transfer.as_deref(), target) {
        DropOutcome::Move { task_id, to } => {
            let seq = app.fetch_seq.issue();
            spawn_drop_worker(
                app.gateway.clone(),
                project.id,
                task_id,
                to,
                seq,
                ui_tx.clone(),
            );
            app.set_info(format!("moving to {}", to.label()));
        }
        DropOutcome::SameColumn => app.set_info("status unchanged".to_string()),
        DropOutcome::Rejected => {}
    }
}

fn spawn_loader(gateway: Arc<dyn Gateway>, req_rx: Receiver<LoadRequest>, ui_tx: Sender<UiMsg>) {
    thread::spawn(move || {
        while let Ok(req) = req_rx.recv() {
            match req {
                LoadRequest::Reload { seq, project_id } => {
                    match gateway.tasks(&project_id, None, None) {
                        Ok(tasks) => {
                            let _ = ui_tx.send(UiMsg::TasksLoaded { seq, tasks });
                        }
                        Err(err) => {
                            let _ = ui_tx.send(UiMsg::TasksFailed {
                                seq,
                                error: err.to_string(),
                            });
                        }
                    }
                }
                LoadRequest::Comments { task_id } => match gateway.task_comments(&task_id) {
                    Ok(comments) => {
                        let _ = ui_tx.send(UiMsg::CommentsLoaded { task_id, comments });
                    }
                    Err(err) => {
                        let _ = ui_tx.send(UiMsg::CommentsFailed {
                            task_id,
                            error: err.to_string(),
                        });
                    }
                },
            }
        }
    });
}

fn spawn_drop_worker(
    gateway: Arc<dyn Gateway>,
    project_id: String,
    task_id: String,
    to: TaskStatus,
    seq: u64,
    ui_tx: Sender<UiMsg>,
) {
    thread::spawn(move || {
        if let Err(err) = gateway.update_task(&task_id, &TaskChanges::status_only(to)) {
            let _ = ui_tx.send(UiMsg::UpdateFailed(err.to_string()));
        }
        // the refetch runs whatever the update came back with
        match gateway.tasks(&project_id, None, None) {
            Ok(tasks) => {
                let _ = ui_tx.send(UiMsg::TasksLoaded { seq, tasks });
            }
            Err(err) => {
                let _ = ui_tx.send(UiMsg::TasksFailed {
                    seq,
                    error: err.to_string(),
                });
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::board::testing::{task_fixture, FakeGateway};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn project_ref() -> ProjectRef {
        ProjectRef {
            id: "p-1".to_string(),
            name: "Alpha".to_string(),
            organization: None,
        }
    }

    fn seeded_app(gateway: Arc<FakeGateway>, tasks: Vec<Task>) -> AppState {
        let mut app = AppState::new(gateway, Some(project_ref()), None, None);
        let seq = app.fetch_seq.issue();
        handle_ui_msg(
            &mut app,
            UiMsg::TasksLoaded { seq, tasks },
            &mpsc::channel().0,
        );
        app
    }

    #[test]
    fn stale_refetch_response_is_discarded() {
        let gateway = Arc::new(FakeGateway::new());
        let mut app = AppState::new(gateway, Some(project_ref()), None, None);
        let (req_tx, _req_rx) = mpsc::channel();

        let first = app.fetch_seq.issue();
        let second = app.fetch_seq.issue();

        handle_ui_msg(
            &mut app,
            UiMsg::TasksLoaded {
                seq: second,
                tasks: vec![task_fixture("t-new", "Newer", TaskStatus::Done)],
            },
            &req_tx,
        );
        handle_ui_msg(
            &mut app,
            UiMsg::TasksLoaded {
                seq: first,
                tasks: vec![task_fixture("t-old", "Older", TaskStatus::Todo)],
            },
            &req_tx,
        );

        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks[0].id, "t-new");
    }

    #[test]
    fn stale_failure_does_not_clobber_newer_board() {
        let gateway = Arc::new(FakeGateway::new());
        let mut app = AppState::new(gateway, Some(project_ref()), None, None);
        let (req_tx, _req_rx) = mpsc::channel();

        let first = app.fetch_seq.issue();
        let second = app.fetch_seq.issue();
        handle_ui_msg(
            &mut app,
            UiMsg::TasksLoaded {
                seq: second,
                tasks: vec![task_fixture("t-new", "Newer", TaskStatus::Done)],
            },
            &req_tx,
        );
        handle_ui_msg(
            &mut app,
            UiMsg::TasksFailed {
                seq: first,
                error: "boom".to_string(),
            },
            &req_tx,
        );

        assert!(app.load_error.is_none());
        assert_eq!(app.tasks[0].id, "t-new");
    }

    #[test]
    fn drop_on_other_column_issues_update_then_refetch() {
        let gateway = Arc::new(FakeGateway::with_tasks(vec![task_fixture(
            "t-1",
            "One",
            TaskStatus::Todo,
        )]));
        let mut app = seeded_app(gateway.clone(), vec![task_fixture(
            "t-1",
            "One",
            TaskStatus::Todo,
        )]);
        let (req_tx, _req_rx) = mpsc::channel();
        let (ui_tx, ui_rx) = mpsc::channel();

        handle_key(&mut app, key(KeyCode::Char(' ')), &req_tx, &ui_tx);
        assert_eq!(app.drag.hover_target(), Some(TaskStatus::Todo));
        handle_key(&mut app, key(KeyCode::Right), &req_tx, &ui_tx);
        assert_eq!(app.drag.hover_target(), Some(TaskStatus::InProgress));
        handle_key(&mut app, key(KeyCode::Enter), &req_tx, &ui_tx);
        assert!(app.drag.is_idle());

        // the worker reports back over the channel once both calls are done
        let msg = ui_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("worker result");
        assert!(matches!(msg, UiMsg::TasksLoaded { .. }));

        let calls = gateway.recorded();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("update_task t-1"));
        assert!(calls[0].contains("IN_PROGRESS"));
        assert_eq!(calls[1], "tasks p-1");
    }

    #[test]
    fn drop_on_own_column_makes_no_calls() {
        let gateway = Arc::new(FakeGateway::with_tasks(vec![task_fixture(
            "t-1",
            "One",
            TaskStatus::Todo,
        )]));
        let mut app = seeded_app(gateway.clone(), vec![task_fixture(
            "t-1",
            "One",
            TaskStatus::Todo,
        )]);
        let (req_tx, _req_rx) = mpsc::channel();
        let (ui_tx, _ui_rx) = mpsc::channel();

        handle_key(&mut app, key(KeyCode::Char(' ')), &req_tx, &ui_tx);
        handle_key(&mut app, key(KeyCode::Enter), &req_tx, &ui_tx);

        assert!(app.drag.is_idle());
        assert!(app.drag_transfer.is_none());
        assert!(gateway.recorded().is_empty());
        let (message, _) = app.status_line().expect("status line");
        assert_eq!(message, "status unchanged");
    }

    #[test]
    fn malformed_transfer_aborts_silently_with_clean_state() {
        let gateway = Arc::new(FakeGateway::with_tasks(vec![task_fixture(
            "t-1",
            "One",
            TaskStatus::Todo,
        )]));
        let mut app = seeded_app(gateway.clone(), vec![task_fixture(
            "t-1",
            "One",
            TaskStatus::Todo,
        )]);
        let (req_tx, _req_rx) = mpsc::channel();
        let (ui_tx, _ui_rx) = mpsc::channel();

        handle_key(&mut app, key(KeyCode::Char(' ')), &req_tx, &ui_tx);
        app.drag_transfer = Some("not-json".to_string());
        handle_key(&mut app, key(KeyCode::Right), &req_tx, &ui_tx);
        handle_key(&mut app, key(KeyCode::Enter), &req_tx, &ui_tx);

        assert!(app.drag.is_idle());
        assert!(app.drag_transfer.is_none());
        assert!(app.drag.hover_target().is_none());
        assert!(gateway.recorded().is_empty());
    }

    #[test]
    fn escape_cancels_a_drag_without_network_effect() {
        let gateway = Arc::new(FakeGateway::with_tasks(vec![task_fixture(
            "t-1",
            "One",
            TaskStatus::Todo,
        )]));
        let mut app = seeded_app(gateway.clone(), vec![task_fixture(
            "t-1",
            "One",
            TaskStatus::Todo,
        )]);
        let (req_tx, _req_rx) = mpsc::channel();
        let (ui_tx, _ui_rx) = mpsc::channel();

        handle_key(&mut app, key(KeyCode::Char(' ')), &req_tx, &ui_tx);
        handle_key(&mut app, key(KeyCode::Right), &req_tx, &ui_tx);
        handle_key(&mut app, key(KeyCode::Esc), &req_tx, &ui_tx);

        assert!(app.drag.is_idle());
        assert!(app.drag_transfer.is_none());
        assert!(gateway.recorded().is_empty());
    }

    #[test]
    fn failed_update_still_triggers_the_refetch() {
        let gateway = Arc::new(FakeGateway::with_tasks(vec![task_fixture(
            "t-1",
            "One",
            TaskStatus::Todo,
        )]));
        gateway.fail_next_update();
        let mut app = seeded_app(gateway.clone(), vec![task_fixture(
            "t-1",
            "One",
            TaskStatus::Todo,
        )]);
        let (req_tx, _req_rx) = mpsc::channel();
        let (ui_tx, ui_rx) = mpsc::channel();

        handle_key(&mut app, key(KeyCode::Char(' ')), &req_tx, &ui_tx);
        handle_key(&mut app, key(KeyCode::Right), &req_tx, &ui_tx);
        handle_key(&mut app, key(KeyCode::Enter), &req_tx, &ui_tx);

        let first = ui_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("update failure");
        assert!(matches!(first, UiMsg::UpdateFailed(_)));
        let second = ui_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("refetch result");
        assert!(matches!(second, UiMsg::TasksLoaded { .. }));

        let calls = gateway.recorded();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], "tasks p-1");
    }

    #[test]
    fn stepping_off_the_edge_leaves_and_reenters() {
        let gateway = Arc::new(FakeGateway::new());
        let mut app = seeded_app(gateway, vec![task_fixture("t-1", "One", TaskStatus::Todo)]);
        let (req_tx, _req_rx) = mpsc::channel();
        let (ui_tx, _ui_rx) = mpsc::channel();

        handle_key(&mut app, key(KeyCode::Char(' ')), &req_tx, &ui_tx);
        assert_eq!(app.drag.hover_target(), Some(TaskStatus::Todo));

        // off the left edge: target clears but the drag stays alive
        handle_key(&mut app, key(KeyCode::Left), &req_tx, &ui_tx);
        assert!(app.drag.hover_target().is_none());
        assert_eq!(app.drag.dragging_task(), Some("t-1"));

        // stepping further off is a no-op
        handle_key(&mut app, key(KeyCode::Left), &req_tx, &ui_tx);
        assert!(app.drag.hover_target().is_none());

        // stepping back re-enters at the leftmost column
        handle_key(&mut app, key(KeyCode::Right), &req_tx, &ui_tx);
        assert_eq!(app.drag.hover_target(), Some(TaskStatus::Todo));
    }

    #[test]
    fn new_drag_can_begin_while_a_refetch_is_pending() {
        let gateway = Arc::new(FakeGateway::with_tasks(vec![
            task_fixture("t-1", "One", TaskStatus::Todo),
            task_fixture("t-2", "Two", TaskStatus::Todo),
        ]));
        let mut app = seeded_app(gateway.clone(), vec![
            task_fixture("t-1", "One", TaskStatus::Todo),
            task_fixture("t-2", "Two", TaskStatus::Todo),
        ]);
        let (req_tx, _req_rx) = mpsc::channel();
        let (ui_tx, ui_rx) = mpsc::channel();

        handle_key(&mut app, key(KeyCode::Char(' ')), &req_tx, &ui_tx);
        handle_key(&mut app, key(KeyCode::Right), &req_tx, &ui_tx);
        handle_key(&mut app, key(KeyCode::Enter), &req_tx, &ui_tx);
        assert!(app.drag.is_idle());

        // grab the second card before the first drop's refetch resolves
        handle_key(&mut app, key(KeyCode::Down), &req_tx, &ui_tx);
        handle_key(&mut app, key(KeyCode::Char(' ')), &req_tx, &ui_tx);
        assert_eq!(app.drag.dragging_task(), Some("t-2"));

        let msg = ui_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("worker result");
        assert!(matches!(msg, UiMsg::TasksLoaded { .. }));
        assert_eq!(app.drag.dragging_task(), Some("t-2"));
    }

    #[test]
    fn filter_typing_rebuilds_columns() {
        let gateway = Arc::new(FakeGateway::new());
        let mut app = seeded_app(
            gateway,
            vec![
                task_fixture("t-1", "Fix sync", TaskStatus::Todo),
                task_fixture("t-2", "Write docs", TaskStatus::Todo),
            ],
        );
        let (req_tx, _req_rx) = mpsc::channel();
        let (ui_tx, _ui_rx) = mpsc::channel();

        handle_key(&mut app, key(KeyCode::Char('/')), &req_tx, &ui_tx);
        for ch in "sync".chars() {
            handle_key(&mut app, key(KeyCode::Char(ch)), &req_tx, &ui_tx);
        }
        assert_eq!(app.columns.tasks_in(TaskStatus::Todo).len(), 1);

        handle_key(&mut app, key(KeyCode::Esc), &req_tx, &ui_tx);
        assert_eq!(app.columns.tasks_in(TaskStatus::Todo).len(), 2);
    }

    #[test]
    fn reload_after_drop_keeps_cursor_on_the_moved_card() {
        let gateway = Arc::new(FakeGateway::new());
        let mut app = seeded_app(gateway, vec![task_fixture("t-1", "One", TaskStatus::Todo)]);
        let (req_tx, _req_rx) = mpsc::channel();

        let seq = app.fetch_seq.issue();
        handle_ui_msg(
            &mut app,
            UiMsg::TasksLoaded {
                seq,
                tasks: vec![task_fixture("t-1", "One", TaskStatus::InProgress)],
            },
            &req_tx,
        );
        assert_eq!(app.cursor.status(), TaskStatus::InProgress);
        let selected = app.selected_task().expect("selected");
        assert_eq!(selected.id, "t-1");
    }
}
