use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::{Task, TaskPriority, TaskStatus};
use crate::ui::board::actions::TaskFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    NewTask,
    EditTask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFieldId {
    Title,
    Priority,
    Assignee,
    DueDate,
    Description,
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
}

#[derive(Debug, Clone)]
pub struct EditorState {
    kind: EditorKind,
    fields: Vec<EditorField>,
    active: usize,
    confirming: bool,
    error: Option<String>,
    task_id: Option<String>,
}

impl EditorState {
    pub fn new_task() -> Self {
        Self {
            kind: EditorKind::NewTask,
            fields: blank_fields(),
            active: 0,
            confirming: false,
            error: None,
            task_id: None,
        }
    }

    pub fn edit_task(task: &Task) -> Self {
        let mut fields = blank_fields();
        for field in &mut fields {
            field.value = match field.id {
                EditorFieldId::Title => task.title.clone(),
                EditorFieldId::Priority => task.priority.label().to_string(),
                EditorFieldId::Assignee => task.assignee_email.clone().unwrap_or_default(),
                EditorFieldId::DueDate => task
                    .due_date
                    .map(|due| due.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                EditorFieldId::Description => task.description.clone(),
            };
        }
        Self {
            kind: EditorKind::EditTask,
            fields,
            active: 0,
            confirming: false,
            error: None,
            task_id: Some(task.id.clone()),
        }
    }

    pub fn kind(&self) -> EditorKind {
        self.kind
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
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

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorAction {
        if self.confirming {
            return self.handle_confirm_key(key);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('u') {
            if let Some(field) = self.current_field_mut() {
                field.value.clear();
            }
            self.error = None;
            return EditorAction::None;
        }

        match key.code {
            KeyCode::Esc => return EditorAction::Cancel,
            KeyCode::Tab | KeyCode::Down => {
                self.move_active(1);
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_active(-1);
            }
            KeyCode::Enter => {
                if self.active + 1 >= self.fields.len() {
                    return self.attempt_confirm();
                }
                self.move_active(1);
            }
            KeyCode::Backspace => {
                if let Some(field) = self.current_field_mut() {
                    field.value.pop();
                }
            }
            KeyCode::Char(ch) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return EditorAction::None;
                }
                if !ch.is_control() {
                    if let Some(field) = self.current_field_mut() {
                        field.value.push(ch);
                    }
                }
            }
            _ => {}
        }

        self.error = None;
        EditorAction::None
    }

    pub fn build_submit(&self) -> Result<TaskFields, String> {
        self.validate()?;
        let priority = match non_empty(self.field_value(EditorFieldId::Priority)) {
            Some(raw) => TaskPriority::parse(&raw).map_err(|err| err.to_string())?,
            None => TaskPriority::default(),
        };
        let due_date = match non_empty(self.field_value(EditorFieldId::DueDate)) {
            Some(raw) => Some(parse_due_date(&raw)?),
            None => None,
        };

        Ok(TaskFields {
            title: self.field_value(EditorFieldId::Title).trim().to_string(),
            description: self.field_value(EditorFieldId::Description).to_string(),
            priority,
            assignee_email: non_empty(self.field_value(EditorFieldId::Assignee)),
            due_date,
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
        let title = self.field_value(EditorFieldId::Title).trim();
        if title.chars().count() < 2 {
            return Err("title must be at least 2 characters".to_string());
        }
        if let Some(priority) = non_empty(self.field_value(EditorFieldId::Priority)) {
            if TaskPriority::parse(&priority).is_err() {
                return Err("priority must be low, medium, high or urgent".to_string());
            }
        }
        if let Some(assignee) = non_empty(self.field_value(EditorFieldId::Assignee)) {
            if crate::types::validate_email(&assignee).is_err() {
                return Err("assignee must be an email address".to_string());
            }
        }
        if let Some(due) = non_empty(self.field_value(EditorFieldId::DueDate)) {
            parse_due_date(&due)?;
        }
        Ok(())
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

    fn current_field_mut(&mut self) -> Option<&mut EditorField> {
        self.fields.get_mut(self.active)
    }

    fn field_value(&self, id: EditorFieldId) -> &str {
        self.fields
            .iter()
            .find(|field| field.id == id)
            .map(|field| field.value.as_str())
            .unwrap_or("")
    }
}

fn blank_fields() -> Vec<EditorField> {
    vec![
        EditorField {
            id: EditorFieldId::Title,
            label: "Title",
            value: String::new(),
            required: true,
        },
        EditorField {
            id: EditorFieldId::Priority,
            label: "Priority",
            value: String::new(),
            required: false,
        },
        EditorField {
            id: EditorFieldId::Assignee,
            label: "Assignee",
            value: String::new(),
            required: false,
        },
        EditorField {
            id: EditorFieldId::DueDate,
            label: "Due (YYYY-MM-DD)",
            value: String::new(),
            required: false,
        },
        EditorField {
            id: EditorFieldId::Description,
            label: "Description",
            value: String::new(),
            required: false,
        },
    ]
}

fn parse_due_date(raw: &str) -> Result<chrono::DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| "due date must be YYYY-MM-DD".to_string())?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Single-line input used for the comment box.
#[derive(Debug, Clone)]
pub struct TextPrompt {
    label: &'static str,
    value: String,
}

impl TextPrompt {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('u') {
            self.value.clear();
            return EditorAction::None;
        }
        match key.code {
            KeyCode::Esc => EditorAction::Cancel,
            KeyCode::Enter => EditorAction::Submit,
            KeyCode::Backspace => {
                self.value.pop();
                EditorAction::None
            }
            KeyCode::Char(ch) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL) && !ch.is_control() {
                    self.value.push(ch);
                }
                EditorAction::None
            }
            _ => EditorAction::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerAction {
    None,
    Cancel,
    Confirm,
}

/// Modal list over a fixed option set, used for status and priority.
#[derive(Debug, Clone)]
pub struct ListPicker<T> {
    options: Vec<T>,
    selected: usize,
    original: T,
}

impl<T: Copy + PartialEq> ListPicker<T> {
    pub fn new(options: &[T], current: T) -> Self {
        let selected = options
            .iter()
            .position(|option| *option == current)
            .unwrap_or(0);
        Self {
            options: options.to_vec(),
            selected,
            original: current,
        }
    }

    pub fn options(&self) -> &[T] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> T {
        self.options
            .get(self.selected)
            .copied()
            .unwrap_or(self.original)
    }

    pub fn original(&self) -> T {
        self.original
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        match key.code {
            KeyCode::Esc => return PickerAction::Cancel,
            KeyCode::Enter => return PickerAction::Confirm,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char(ch) if ch.is_ascii_digit() => {
                if let Some(idx) = ch.to_digit(10).and_then(|value| value.checked_sub(1)) {
                    let idx = idx as usize;
                    if idx < self.options.len() {
                        self.selected = idx;
                    }
                }
            }
            _ => {}
        }
        PickerAction::None
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.options.len() as isize;
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + delta).rem_euclid(len);
        self.selected = next as usize;
    }
}

pub type StatusPicker = ListPicker<TaskStatus>;
pub type PriorityPicker = ListPicker<TaskPriority>;

pub fn status_picker(current: TaskStatus) -> StatusPicker {
    ListPicker::new(&TaskStatus::COLUMNS, current)
}

pub fn priority_picker(current: TaskPriority) -> PriorityPicker {
    ListPicker::new(&TaskPriority::ALL, current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::board::testing::task_fixture;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn set_field(editor: &mut EditorState, id: EditorFieldId, value: &str) {
        while editor.fields()[editor.active_index()].id != id {
            editor.handle_key(key(KeyCode::Tab));
        }
        for ch in value.chars() {
            editor.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn editor_requires_two_char_title() {
        let mut editor = EditorState::new_task();
        set_field(&mut editor, EditorFieldId::Title, "x");
        for _ in 0..editor.fields().len() {
            let action = editor.handle_key(key(KeyCode::Enter));
            assert_eq!(action, EditorAction::None);
        }
        assert_eq!(editor.error(), Some("title must be at least 2 characters"));
    }

    #[test]
    fn editor_validates_due_date_format() {
        let mut editor = EditorState::new_task();
        set_field(&mut editor, EditorFieldId::Title, "Valid title");
        set_field(&mut editor, EditorFieldId::DueDate, "next week");
        let err = editor.build_submit().expect_err("should reject");
        assert_eq!(err, "due date must be YYYY-MM-DD");
    }

    #[test]
    fn editor_validates_assignee_email() {
        let mut editor = EditorState::new_task();
        set_field(&mut editor, EditorFieldId::Title, "Valid title");
        set_field(&mut editor, EditorFieldId::Assignee, "not-an-email");
        let err = editor.build_submit().expect_err("should reject");
        assert_eq!(err, "assignee must be an email address");
    }

    #[test]
    fn editor_submit_parses_fields() {
        let mut editor = EditorState::new_task();
        set_field(&mut editor, EditorFieldId::Title, "  Ship it  ");
        set_field(&mut editor, EditorFieldId::Priority, "high");
        set_field(&mut editor, EditorFieldId::DueDate, "2025-06-01");
        let fields = editor.build_submit().expect("submit");
        assert_eq!(fields.title, "Ship it");
        assert_eq!(fields.priority, TaskPriority::High);
        let due = fields.due_date.expect("due date");
        assert_eq!(due.format("%Y-%m-%d").to_string(), "2025-06-01");
    }

    #[test]
    fn editor_prefills_from_task() {
        let mut task = task_fixture("t-1", "Existing", TaskStatus::Todo);
        task.assignee_email = Some("ana@example.com".to_string());
        let editor = EditorState::edit_task(&task);
        assert_eq!(editor.kind(), EditorKind::EditTask);
        assert_eq!(editor.task_id(), Some("t-1"));
        let title = editor
            .fields()
            .iter()
            .find(|field| field.id == EditorFieldId::Title)
            .map(|field| field.value.as_str());
        assert_eq!(title, Some("Existing"));
        let assignee = editor
            .fields()
            .iter()
            .find(|field| field.id == EditorFieldId::Assignee)
            .map(|field| field.value.as_str());
        assert_eq!(assignee, Some("ana@example.com"));
    }

    #[test]
    fn editor_confirms_before_submitting() {
        let mut editor = EditorState::new_task();
        set_field(&mut editor, EditorFieldId::Title, "Valid title");
        for _ in 0..editor.fields().len() {
            editor.handle_key(key(KeyCode::Enter));
        }
        assert!(editor.confirming());
        let action = editor.handle_key(key(KeyCode::Char('y')));
        assert_eq!(action, EditorAction::Submit);
    }

    #[test]
    fn status_picker_starts_on_current_and_selects_by_digit() {
        let mut picker = status_picker(TaskStatus::Done);
        assert_eq!(picker.selected(), TaskStatus::Done);
        picker.handle_key(key(KeyCode::Char('1')));
        assert_eq!(picker.selected(), TaskStatus::Todo);
        picker.handle_key(key(KeyCode::Down));
        assert_eq!(picker.selected(), TaskStatus::InProgress);
    }

    #[test]
    fn priority_picker_wraps_with_arrows() {
        let mut picker = priority_picker(TaskPriority::Low);
        picker.handle_key(key(KeyCode::Up));
        assert_eq!(picker.selected(), TaskPriority::Urgent);
    }

    #[test]
    fn text_prompt_collects_and_clears() {
        let mut prompt = TextPrompt::new("Comment");
        for ch in "Looks good".chars() {
            prompt.handle_key(key(KeyCode::Char(ch)));
        }
        assert_eq!(prompt.value(), "Looks good");
        let action = prompt.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(action, EditorAction::None);
        assert_eq!(prompt.value(), "");
        assert_eq!(prompt.handle_key(key(KeyCode::Enter)), EditorAction::Submit);
    }
}
