//! End-to-end walks of the drop pipeline: payload, gesture state, column
//! model and the refetch sequence guard, driven the way the board drives
//! them.

use chrono::Utc;
use serde_json::Value;

use pmb::types::{Task, TaskPriority, TaskStatus};
use pmb::ui::board::drag::{resolve_drop, DragPayload, DragState, DropOutcome, FetchSequencer};
use pmb::ui::board::model::{locate_task, BoardColumns, BoardCursor};

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
fn payload_wire_shape_is_camel_case() {
    let encoded = DragPayload::new("t-1", TaskStatus::Todo)
        .encode()
        .expect("encode");
    let value: Value = serde_json::from_str(&encoded).expect("json");
    let object = value.as_object().expect("object");

    assert_eq!(object.len(), 2);
    assert_eq!(object["taskId"], "t-1");
    assert_eq!(object["currentStatus"], "TODO");
}

#[test]
fn todo_card_moves_to_in_progress_and_the_cursor_follows() {
    let before = vec![
        task("t-1", "Wire the login form", TaskStatus::Todo),
        task("t-2", "Ship release notes", TaskStatus::Done),
    ];
    let columns = BoardColumns::build(&before, "");
    let cursor = BoardCursor::default();
    let grabbed = cursor.selected(&before, &columns).expect("card under cursor");
    assert_eq!(grabbed.id, "t-1");

    // Grab, walk the hover across to In Progress, drop.
    let transfer = DragPayload::new(grabbed.id.clone(), grabbed.status)
        .encode()
        .expect("encode");
    let mut state = DragState::Idle;
    state.begin(grabbed.id.clone());
    state.hover(TaskStatus::Todo);
    state.hover(TaskStatus::InProgress);
    let outcome = resolve_drop(&mut state, Some(&transfer), TaskStatus::InProgress);

    assert_eq!(
        outcome,
        DropOutcome::Move {
            task_id: "t-1".to_string(),
            to: TaskStatus::InProgress,
        }
    );
    assert!(state.is_idle());

    // The refetch returns the moved card; the cursor relocates onto it.
    let mut after = before.clone();
    after[0].status = TaskStatus::InProgress;
    let columns = BoardColumns::build(&after, "");
    let cursor = locate_task(&after, &columns, "t-1").expect("moved card present");
    assert_eq!(cursor.status(), TaskStatus::InProgress);
    assert_eq!(cursor.row, 0);
}

#[test]
fn done_card_dropped_on_done_stays_silent() {
    let transfer = DragPayload::new("t-2", TaskStatus::Done)
        .encode()
        .expect("encode");
    let mut state = DragState::Idle;
    state.begin("t-2");
    state.hover(TaskStatus::Done);

    let outcome = resolve_drop(&mut state, Some(&transfer), TaskStatus::Done);

    assert_eq!(outcome, DropOutcome::SameColumn);
    assert!(state.is_idle());
}

#[test]
fn hover_walk_keeps_the_grabbed_card_across_columns() {
    let mut state = DragState::Idle;
    state.begin("t-1");

    for target in [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::InProgress,
    ] {
        state.hover(target);
        assert_eq!(state.dragging_task(), Some("t-1"));
        assert_eq!(state.hover_target(), Some(target));
    }

    let transfer = DragPayload::new("t-1", TaskStatus::Todo)
        .encode()
        .expect("encode");
    let outcome = resolve_drop(&mut state, Some(&transfer), TaskStatus::InProgress);
    assert!(matches!(outcome, DropOutcome::Move { .. }));
}

#[test]
fn rapid_drops_keep_only_the_later_refetch() {
    let mut sequencer = FetchSequencer::new();

    // Two drops in quick succession, each issuing its own refetch.
    let mut state = DragState::Idle;
    state.begin("t-1");
    state.hover(TaskStatus::InProgress);
    let first_transfer = DragPayload::new("t-1", TaskStatus::Todo)
        .encode()
        .expect("encode");
    let first = resolve_drop(&mut state, Some(&first_transfer), TaskStatus::InProgress);
    assert!(matches!(first, DropOutcome::Move { .. }));
    let first_seq = sequencer.issue();

    state.begin("t-2");
    state.hover(TaskStatus::Done);
    let second_transfer = DragPayload::new("t-2", TaskStatus::InProgress)
        .encode()
        .expect("encode");
    let second = resolve_drop(&mut state, Some(&second_transfer), TaskStatus::Done);
    assert!(matches!(second, DropOutcome::Move { .. }));
    let second_seq = sequencer.issue();

    // The slower first response lands after the second: it is stale.
    assert!(sequencer.admit(second_seq));
    assert!(!sequencer.admit(first_seq));

    // A later manual reload supersedes both.
    let reload_seq = sequencer.issue();
    assert!(sequencer.admit(reload_seq));
}

#[test]
fn moved_card_hidden_by_the_filter_falls_back_to_a_clamped_cursor() {
    let after = vec![
        task("t-1", "Refactor parser", TaskStatus::InProgress),
        task("t-2", "Add fuzzing", TaskStatus::Todo),
    ];

    // The active filter no longer matches the moved card.
    let columns = BoardColumns::build(&after, "fuzz");
    assert!(locate_task(&after, &columns, "t-1").is_none());

    let mut cursor = BoardCursor { column: 1, row: 4 };
    cursor.clamp(&columns);
    assert_eq!(cursor.row, 0);
    assert_eq!(cursor.status(), TaskStatus::InProgress);
}
