//! Pure data helpers for the board: column partitioning, filtering, and
//! cursor movement. Server order within a column is preserved as received.

use crate::types::{Task, TaskStatus};

fn normalize_text(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

fn fuzzy_match(value: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let mut query_chars = query.chars();
    let mut current = query_chars.next();
    for ch in value.chars() {
        if Some(ch) == current {
            current = query_chars.next();
            if current.is_none() {
                return true;
            }
        }
    }
    false
}

pub fn column_status(column: usize) -> TaskStatus {
    TaskStatus::COLUMNS[column.min(TaskStatus::COLUMNS.len() - 1)]
}

/// Task indices per column, in fixed column order. Indices point into the
/// task slice the columns were built from.
#[derive(Debug, Clone, Default)]
pub struct BoardColumns {
    columns: [Vec<usize>; TaskStatus::COLUMNS.len()],
}

impl BoardColumns {
    pub fn build(tasks: &[Task], query: &str) -> Self {
        let query_norm = normalize_text(query);
        let mut columns: [Vec<usize>; TaskStatus::COLUMNS.len()] = Default::default();
        for (idx, task) in tasks.iter().enumerate() {
            if !query_norm.is_empty() {
                let title_norm = normalize_text(&task.title);
                let assignee_norm = task.assignee_email.as_deref().map(normalize_text);
                let title_hit = fuzzy_match(&title_norm, &query_norm);
                let assignee_hit = assignee_norm
                    .as_deref()
                    .map(|value| fuzzy_match(value, &query_norm))
                    .unwrap_or(false);
                if !title_hit && !assignee_hit {
                    continue;
                }
            }
            columns[task.status.column_index()].push(idx);
        }
        Self { columns }
    }

    pub fn tasks_in(&self, status: TaskStatus) -> &[usize] {
        &self.columns[status.column_index()]
    }

    pub fn column(&self, column: usize) -> &[usize] {
        &self.columns[column.min(self.columns.len() - 1)]
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Cursor position: a column and a row within it. The cursor may sit on an
/// empty column so that tasks can be dropped into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardCursor {
    pub column: usize,
    pub row: usize,
}

impl BoardCursor {
    pub fn status(&self) -> TaskStatus {
        column_status(self.column)
    }

    pub fn move_up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    pub fn move_down(&mut self, columns: &BoardColumns) {
        let len = columns.column(self.column).len();
        if len > 0 && self.row + 1 < len {
            self.row += 1;
        }
    }

    /// Step one column left. Returns false at the board edge.
    pub fn move_left(&mut self, columns: &BoardColumns) -> bool {
        if self.column == 0 {
            return false;
        }
        self.column -= 1;
        self.clamp_row(columns);
        true
    }

    /// Step one column right. Returns false at the board edge.
    pub fn move_right(&mut self, columns: &BoardColumns) -> bool {
        if self.column + 1 >= TaskStatus::COLUMNS.len() {
            return false;
        }
        self.column += 1;
        self.clamp_row(columns);
        true
    }

    fn clamp_row(&mut self, columns: &BoardColumns) {
        let len = columns.column(self.column).len();
        if len == 0 {
            self.row = 0;
        } else if self.row >= len {
            self.row = len - 1;
        }
    }

    /// Bring the cursor back onto valid coordinates after a reload.
    pub fn clamp(&mut self, columns: &BoardColumns) {
        if self.column >= TaskStatus::COLUMNS.len() {
            self.column = TaskStatus::COLUMNS.len() - 1;
        }
        self.clamp_row(columns);
    }

    pub fn selected<'a>(&self, tasks: &'a [Task], columns: &BoardColumns) -> Option<&'a Task> {
        let idx = *columns.column(self.column).get(self.row)?;
        tasks.get(idx)
    }
}

/// Locate a task by id after a reload so the cursor can follow it across
/// column moves.
pub fn locate_task(tasks: &[Task], columns: &BoardColumns, task_id: &str) -> Option<BoardCursor> {
    for (column, rows) in (0..TaskStatus::COLUMNS.len()).map(|col| (col, columns.column(col))) {
        for (row, idx) in rows.iter().enumerate() {
            if tasks.get(*idx).map(|task| task.id.as_str()) == Some(task_id) {
                return Some(BoardCursor { column, row });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskPriority;
    use chrono::Utc;

    fn task(id: &str, title: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            status,
            priority: TaskPriority::Medium,
            assignee_email: None,
            due_date: None,
            created_at: Utc::now(),
            updated_at: None,
            comment_count: 0,
            project: None,
        }
    }

    #[test]
    fn columns_partition_in_fixed_order_preserving_input_order() {
        let tasks = vec![
            task("t-1", "First", TaskStatus::Done),
            task("t-2", "Second", TaskStatus::Todo),
            task("t-3", "Third", TaskStatus::Todo),
            task("t-4", "Fourth", TaskStatus::Blocked),
        ];
        let columns = BoardColumns::build(&tasks, "");
        assert_eq!(columns.tasks_in(TaskStatus::Todo), &[1, 2]);
        assert_eq!(columns.tasks_in(TaskStatus::InProgress), &[] as &[usize]);
        assert_eq!(columns.tasks_in(TaskStatus::Done), &[0]);
        assert_eq!(columns.tasks_in(TaskStatus::Blocked), &[3]);
        assert_eq!(columns.total(), 4);
    }

    #[test]
    fn filter_matches_title_and_assignee_fuzzily() {
        let mut with_assignee = task("t-1", "Fix sync", TaskStatus::Todo);
        with_assignee.assignee_email = Some("ana@example.com".to_string());
        let tasks = vec![
            with_assignee,
            task("t-2", "Write docs", TaskStatus::InProgress),
        ];

        let columns = BoardColumns::build(&tasks, "SYNC");
        assert_eq!(columns.tasks_in(TaskStatus::Todo), &[0]);
        assert!(columns.tasks_in(TaskStatus::InProgress).is_empty());

        let columns = BoardColumns::build(&tasks, "ana@");
        assert_eq!(columns.tasks_in(TaskStatus::Todo), &[0]);

        let columns = BoardColumns::build(&tasks, "zzz");
        assert!(columns.is_empty());
    }

    #[test]
    fn cursor_clamps_rows_when_switching_columns() {
        let tasks = vec![
            task("t-1", "One", TaskStatus::Todo),
            task("t-2", "Two", TaskStatus::Todo),
            task("t-3", "Three", TaskStatus::Todo),
            task("t-4", "Four", TaskStatus::InProgress),
        ];
        let columns = BoardColumns::build(&tasks, "");
        let mut cursor = BoardCursor { column: 0, row: 2 };
        assert!(cursor.move_right(&columns));
        assert_eq!(cursor.column, 1);
        assert_eq!(cursor.row, 0);
    }

    #[test]
    fn cursor_reports_edges_without_wrapping() {
        let tasks = vec![task("t-1", "One", TaskStatus::Todo)];
        let columns = BoardColumns::build(&tasks, "");
        let mut cursor = BoardCursor::default();
        assert!(!cursor.move_left(&columns));
        assert_eq!(cursor.column, 0);

        cursor.column = TaskStatus::COLUMNS.len() - 1;
        assert!(!cursor.move_right(&columns));
        assert_eq!(cursor.column, TaskStatus::COLUMNS.len() - 1);
    }

    #[test]
    fn cursor_can_rest_on_an_empty_column() {
        let tasks = vec![task("t-1", "One", TaskStatus::Todo)];
        let columns = BoardColumns::build(&tasks, "");
        let mut cursor = BoardCursor::default();
        assert!(cursor.move_right(&columns));
        assert_eq!(cursor.status(), TaskStatus::InProgress);
        assert!(cursor.selected(&tasks, &columns).is_none());
    }

    #[test]
    fn vertical_movement_stays_inside_the_column() {
        let tasks = vec![
            task("t-1", "One", TaskStatus::Todo),
            task("t-2", "Two", TaskStatus::Todo),
        ];
        let columns = BoardColumns::build(&tasks, "");
        let mut cursor = BoardCursor::default();
        cursor.move_up();
        assert_eq!(cursor.row, 0);
        cursor.move_down(&columns);
        assert_eq!(cursor.row, 1);
        cursor.move_down(&columns);
        assert_eq!(cursor.row, 1);
    }

    #[test]
    fn clamp_recovers_after_a_shrinking_reload() {
        let mut cursor = BoardCursor { column: 0, row: 1 };
        let after = vec![task("t-1", "One", TaskStatus::Todo)];
        let columns = BoardColumns::build(&after, "");
        cursor.clamp(&columns);
        assert_eq!(cursor.row, 0);
    }

    #[test]
    fn locate_task_follows_a_moved_card() {
        let tasks = vec![
            task("t-1", "One", TaskStatus::Todo),
            task("t-2", "Two", TaskStatus::Done),
        ];
        let columns = BoardColumns::build(&tasks, "");
        let cursor = locate_task(&tasks, &columns, "t-2").expect("present");
        assert_eq!(cursor.status(), TaskStatus::Done);
        assert_eq!(cursor.row, 0);
        assert!(locate_task(&tasks, &columns, "t-9").is_none());
    }
}
