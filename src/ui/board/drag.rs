//! Drag gesture state for the board.
//!
//! A drag is a tagged state machine: `Idle`, `Dragging` once a card is
//! grabbed, `Hovering` once a target column is under the cursor. The
//! payload travels across the gesture as an encoded string (the transfer
//! slot), written once when the grab starts and decoded once at drop time;
//! a payload that fails to decode aborts the drop silently after a log
//! line. Refetches triggered by drops are sequenced so a stale response
//! can never overwrite a newer one.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::types::TaskStatus;

/// Payload carried by an active drag gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    pub task_id: String,
    pub current_status: TaskStatus,
}

impl DragPayload {
    pub fn new(task_id: impl Into<String>, current_status: TaskStatus) -> Self {
        Self {
            task_id: task_id.into(),
            current_status,
        }
    }

    /// Serialize for the transfer slot. The only counterpart is [`decode`].
    ///
    /// [`decode`]: DragPayload::decode
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a transfer slot. Failure here is the single malformed-payload
    /// path: the caller logs and abandons the drop.
    pub fn decode(raw: &str) -> Result<DragPayload> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Gesture state. `Hovering` without a drag is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        task_id: String,
    },
    Hovering {
        task_id: String,
        target: TaskStatus,
    },
}

impl DragState {
    /// Grab a card. A new grab supersedes any gesture still in progress.
    pub fn begin(&mut self, task_id: impl Into<String>) {
        *self = DragState::Dragging {
            task_id: task_id.into(),
        };
    }

    /// Move the hover target to a column. Re-hovering the same column is a
    /// no-op; hovering without an active drag is ignored.
    pub fn hover(&mut self, target: TaskStatus) {
        match self {
            DragState::Idle => {}
            DragState::Dragging { task_id } | DragState::Hovering { task_id, .. } => {
                *self = DragState::Hovering {
                    task_id: std::mem::take(task_id),
                    target,
                };
            }
        }
    }

    /// Clear only the hover target, keeping the drag alive.
    pub fn leave(&mut self) {
        if let DragState::Hovering { task_id, .. } = self {
            *self = DragState::Dragging {
                task_id: std::mem::take(task_id),
            };
        }
    }

    /// Terminate the gesture without a drop.
    pub fn end(&mut self) {
        *self = DragState::Idle;
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }

    pub fn dragging_task(&self) -> Option<&str> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { task_id } | DragState::Hovering { task_id, .. } => {
                Some(task_id.as_str())
            }
        }
    }

    pub fn hover_target(&self) -> Option<TaskStatus> {
        match self {
            DragState::Hovering { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Rendering contract: a card is dimmed exactly while it is dragged.
    pub fn is_dragging_task(&self, task_id: &str) -> bool {
        self.dragging_task() == Some(task_id)
    }

    /// Rendering contract: a column is highlighted exactly while targeted.
    pub fn is_hover_target(&self, status: TaskStatus) -> bool {
        self.hover_target() == Some(status)
    }
}

/// What a completed drop resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Payload decoded and the column differs: issue one status update,
    /// then one refetch.
    Move { task_id: String, to: TaskStatus },
    /// Dropped back on its own column: no network effect.
    SameColumn,
    /// Payload missing or malformed: logged, nothing issued.
    Rejected,
}

/// Resolve a drop on `target` against the transfer slot contents.
///
/// The hover target clears first and the whole gesture state clears last,
/// whichever branch is taken.
pub fn resolve_drop(
    state: &mut DragState,
    transfer: Option<&str>,
    target: TaskStatus,
) -> DropOutcome {
    state.leave();
    let outcome = match transfer {
        Some(raw) => match DragPayload::decode(raw) {
            Ok(payload) => {
                if payload.current_status == target {
                    DropOutcome::SameColumn
                } else {
                    DropOutcome::Move {
                        task_id: payload.task_id,
                        to: target,
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "discarding malformed drag payload");
                DropOutcome::Rejected
            }
        },
        None => {
            warn!("drop without a drag payload");
            DropOutcome::Rejected
        }
    };
    state.end();
    outcome
}

/// Allocates refetch sequence numbers and filters stale responses.
///
/// A number is taken at issue time; a response is applied only when no
/// later-issued response has been applied before it.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    issued: u64,
    applied: u64,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the sequence number for a fetch being issued now.
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Whether a response with this sequence number may be applied.
    /// Admitting it marks it applied.
    pub fn admit(&mut self, seq: u64) -> bool {
        if seq > self.applied {
            self.applied = seq;
            true
        } else {
            false
        }
    }

    pub fn last_applied(&self) -> u64 {
        self.applied
    }
}
