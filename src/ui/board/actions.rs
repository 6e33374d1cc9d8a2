//! Board actions that reach the gateway. Each returns an [`ActionOutcome`]
//! for the status line; the caller decides whether a reload follows.

use chrono::{DateTime, Utc};

use crate::client::Gateway;
use crate::error::{Error, Result};
use crate::types::{
    validate_email, validate_title, NewTaskInput, Task, TaskChanges, TaskPriority, TaskStatus,
};

/// Validated fields shared by the create and edit forms.
#[derive(Debug, Clone)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub assignee_email: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub changed: bool,
    pub message: String,
    pub task_id: Option<String>,
}

pub fn change_status(
    gateway: &dyn Gateway,
    task_id: &str,
    current: TaskStatus,
    to: TaskStatus,
) -> Result<ActionOutcome> {
    if current == to {
        return Ok(ActionOutcome {
            changed: false,
            message: "status unchanged".to_string(),
            task_id: Some(task_id.to_string()),
        });
    }

    gateway.update_task(task_id, &TaskChanges::status_only(to))?;

    Ok(ActionOutcome {
        changed: true,
        message: format!("status set to {}", to.label()),
        task_id: Some(task_id.to_string()),
    })
}

pub fn change_priority(
    gateway: &dyn Gateway,
    task_id: &str,
    current: TaskPriority,
    to: TaskPriority,
) -> Result<ActionOutcome> {
    if current == to {
        return Ok(ActionOutcome {
            changed: false,
            message: "priority unchanged".to_string(),
            task_id: Some(task_id.to_string()),
        });
    }

    let changes = TaskChanges {
        priority: Some(to),
        ..TaskChanges::default()
    };
    gateway.update_task(task_id, &changes)?;

    Ok(ActionOutcome {
        changed: true,
        message: format!("priority set to {}", to.label()),
        task_id: Some(task_id.to_string()),
    })
}

pub fn create_task(
    gateway: &dyn Gateway,
    project_id: &str,
    fields: TaskFields,
) -> Result<ActionOutcome> {
    let title = validate_title(&fields.title)?;
    if let Some(email) = fields.assignee_email.as_deref() {
        validate_email(email)?;
    }

    let input = NewTaskInput {
        project_id: project_id.to_string(),
        title,
        description: non_empty(&fields.description),
        status: None,
        priority: Some(fields.priority),
        assignee_email: fields.assignee_email.clone(),
        due_date: fields.due_date,
    };
    let task = gateway.create_task(&input)?;

    Ok(ActionOutcome {
        changed: true,
        message: format!("created {}", task.title),
        task_id: Some(task.id),
    })
}

pub fn update_task_details(
    gateway: &dyn Gateway,
    task: &Task,
    fields: TaskFields,
) -> Result<ActionOutcome> {
    let title = validate_title(&fields.title)?;
    if let Some(email) = fields.assignee_email.as_deref() {
        validate_email(email)?;
    }

    let mut changes = TaskChanges::default();
    if title != task.title {
        changes.title = Some(title);
    }
    if fields.description.trim() != task.description.trim() {
        changes.description = Some(fields.description.clone());
    }
    if fields.priority != task.priority {
        changes.priority = Some(fields.priority);
    }
    let current_assignee = task.assignee_email.as_deref().unwrap_or("");
    let next_assignee = fields.assignee_email.as_deref().unwrap_or("");
    if next_assignee != current_assignee {
        // an empty string clears the assignee server-side
        changes.assignee_email = Some(next_assignee.to_string());
    }
    if let Some(due) = fields.due_date {
        if task.due_date != Some(due) {
            changes.due_date = Some(due);
        }
    }
    // a due date cannot be cleared over the wire, an absent field is left
    // untouched server-side

    if changes.is_empty() {
        return Ok(ActionOutcome {
            changed: false,
            message: "no changes".to_string(),
            task_id: Some(task.id.clone()),
        });
    }

    gateway.update_task(&task.id, &changes)?;

    Ok(ActionOutcome {
        changed: true,
        message: "task updated".to_string(),
        task_id: Some(task.id.clone()),
    })
}

pub fn delete_task(gateway: &dyn Gateway, task_id: &str) -> Result<ActionOutcome> {
    gateway.delete_task(task_id)?;
    Ok(ActionOutcome {
        changed: true,
        message: "task deleted".to_string(),
        task_id: None,
    })
}

pub fn add_comment(
    gateway: &dyn Gateway,
    task_id: &str,
    content: &str,
    author_email: &str,
) -> Result<ActionOutcome> {
    let body = content.trim();
    if body.is_empty() {
        return Err(Error::InvalidArgument(
            "comment cannot be empty".to_string(),
        ));
    }
    validate_email(author_email)?;

    gateway.add_comment(task_id, body, author_email.trim())?;

    Ok(ActionOutcome {
        changed: true,
        message: "comment added".to_string(),
        task_id: Some(task_id.to_string()),
    })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
