//! Domain types for pmb.
//!
//! These mirror the GraphQL API's wire shapes: entity fields are camelCase
//! and enum values are SCREAMING_SNAKE. Columns on the board are not stored
//! anywhere; they are a pure partition of a fetched task list by status.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Task status, in fixed board column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Blocked,
}

impl TaskStatus {
    /// Board columns, left to right.
    pub const COLUMNS: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
            TaskStatus::Blocked => "BLOCKED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
            TaskStatus::Blocked => "Blocked",
        }
    }

    pub fn parse(value: &str) -> Result<TaskStatus> {
        let normalized = value.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            "BLOCKED" => Ok(TaskStatus::Blocked),
            _ => Err(Error::InvalidArgument(format!(
                "unknown task status '{}' (expected TODO, IN_PROGRESS, DONE or BLOCKED)",
                value.trim()
            ))),
        }
    }

    /// Position of this status in the board column order.
    pub fn column_index(&self) -> usize {
        Self::COLUMNS
            .iter()
            .position(|status| status == self)
            .unwrap_or(0)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Urgent => "URGENT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
            TaskPriority::Urgent => "Urgent",
        }
    }

    pub fn parse(value: &str) -> Result<TaskPriority> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(TaskPriority::Low),
            "MEDIUM" => Ok(TaskPriority::Medium),
            "HIGH" => Ok(TaskPriority::High),
            "URGENT" => Ok(TaskPriority::Urgent),
            _ => Err(Error::InvalidArgument(format!(
                "unknown task priority '{}' (expected LOW, MEDIUM, HIGH or URGENT)",
                value.trim()
            ))),
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::OnHold => "ON_HOLD",
            ProjectStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "Active",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<ProjectStatus> {
        let normalized = value.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "ACTIVE" => Ok(ProjectStatus::Active),
            "COMPLETED" => Ok(ProjectStatus::Completed),
            "ON_HOLD" => Ok(ProjectStatus::OnHold),
            "CANCELLED" => Ok(ProjectStatus::Cancelled),
            _ => Err(Error::InvalidArgument(format!(
                "unknown project status '{}' (expected ACTIVE, COMPLETED, ON_HOLD or CANCELLED)",
                value.trim()
            ))),
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub contact_email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub project_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRef {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ProjectStatus,
    // Project due dates are calendar dates on the wire, task due dates are
    // full timestamps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub task_count: u32,
    #[serde(default)]
    pub completed_task_count: u32,
    #[serde(default)]
    pub completion_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRef>,
}

impl Task {
    /// A task is overdue when its due date has passed and it is not done.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => due < now && self.status != TaskStatus::Done,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskComment {
    pub id: String,
    pub content: String,
    pub author_email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationStats {
    pub organization_id: String,
    pub organization_name: String,
    pub total_projects: u32,
    pub active_projects: u32,
    pub completed_projects: u32,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub overall_completion_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub project_id: String,
    pub project_name: String,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub in_progress_tasks: u32,
    pub todo_tasks: u32,
    pub blocked_tasks: u32,
    pub completion_rate: f64,
}

/// Fields for creating a task. The server fills ids and timestamps.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskInput {
    pub project_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update for a task; absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskChanges {
    pub fn status_only(status: TaskStatus) -> Self {
        TaskChanges {
            status: Some(status),
            ..TaskChanges::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assignee_email.is_none()
            && self.due_date.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProjectInput {
    pub organization_slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl ProjectChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganizationInput {
    pub name: String,
    pub contact_email: String,
    // Server slugifies the name when no slug is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

impl OrganizationChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.contact_email.is_none()
    }
}

/// Shared `{success, errors}` envelope carried by every mutation payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutationOutcome {
    pub success: bool,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

impl MutationOutcome {
    /// Turn a rejected outcome into an error carrying the server's reasons.
    pub fn ensure(&self, operation: &str) -> Result<()> {
        if self.success {
            return Ok(());
        }
        let reasons = self
            .errors
            .as_deref()
            .unwrap_or_default()
            .join("; ");
        let message = if reasons.is_empty() {
            format!("{operation} failed")
        } else {
            format!("{operation}: {reasons}")
        };
        Err(Error::MutationRejected(message))
    }
}

/// Validate and normalize a task title: trimmed, at least two characters.
pub fn validate_title(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() < 2 {
        return Err(Error::InvalidArgument(
            "title must be at least 2 characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate an email address the way the task form does: one `@`, a dotted
/// domain, no whitespace.
pub fn validate_email(value: &str) -> Result<()> {
    let trimmed = value.trim();
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && trimmed.chars().all(|ch| !ch.is_whitespace())
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "invalid email address: {trimmed}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_values_are_screaming_snake() {
        let json = serde_json::to_string(&TaskStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"IN_PROGRESS\"");
        let parsed: TaskStatus = serde_json::from_str("\"BLOCKED\"").expect("deserialize");
        assert_eq!(parsed, TaskStatus::Blocked);
    }

    #[test]
    fn status_parse_accepts_case_and_hyphens() {
        assert_eq!(
            TaskStatus::parse("in-progress").expect("parse"),
            TaskStatus::InProgress
        );
        assert_eq!(TaskStatus::parse(" todo ").expect("parse"), TaskStatus::Todo);
        assert!(TaskStatus::parse("archived").is_err());
    }

    #[test]
    fn columns_are_in_display_order() {
        let labels: Vec<&str> = TaskStatus::COLUMNS.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["To Do", "In Progress", "Done", "Blocked"]);
        assert_eq!(TaskStatus::Done.column_index(), 2);
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        assert_eq!(
            TaskPriority::parse("urgent").expect("parse"),
            TaskPriority::Urgent
        );
    }

    #[test]
    fn task_deserializes_from_list_shape() {
        let json = r#"{
            "id": "42",
            "title": "Fix login",
            "description": "",
            "status": "TODO",
            "priority": "HIGH",
            "assigneeEmail": "dev@example.com",
            "dueDate": null,
            "createdAt": "2024-03-01T09:00:00+00:00",
            "commentCount": 3
        }"#;
        let task: Task = serde_json::from_str(json).expect("deserialize");
        assert_eq!(task.id, "42");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.comment_count, 3);
        assert!(task.updated_at.is_none());
        assert!(task.project.is_none());
    }

    #[test]
    fn project_due_date_is_a_calendar_date() {
        let json = r#"{
            "id": "7",
            "name": "Website Redesign",
            "description": "Q2 refresh",
            "status": "ACTIVE",
            "dueDate": "2024-06-30",
            "createdAt": "2024-03-01T09:00:00+00:00",
            "taskCount": 12,
            "completedTaskCount": 4,
            "completionRate": 33.33
        }"#;
        let project: Project = serde_json::from_str(json).expect("deserialize");
        assert_eq!(
            project.due_date,
            Some(NaiveDate::from_ymd_opt(2024, 6, 30).expect("date"))
        );
        assert_eq!(project.status, ProjectStatus::Active);
        assert_eq!(project.completed_task_count, 4);
        assert!(project.organization.is_none());
    }

    #[test]
    fn task_overdue_requires_past_due_and_not_done() {
        let now = Utc::now();
        let json = format!(
            r#"{{
                "id": "1", "title": "T", "status": "TODO", "priority": "LOW",
                "dueDate": "{}", "createdAt": "{}", "commentCount": 0
            }}"#,
            (now - chrono::Duration::days(1)).to_rfc3339(),
            now.to_rfc3339()
        );
        let mut task: Task = serde_json::from_str(&json).expect("deserialize");
        assert!(task.is_overdue(now));
        task.status = TaskStatus::Done;
        assert!(!task.is_overdue(now));
        task.status = TaskStatus::Todo;
        task.due_date = None;
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn task_changes_status_only_serializes_one_field() {
        let changes = TaskChanges::status_only(TaskStatus::Done);
        let json = serde_json::to_value(&changes).expect("serialize");
        let object = json.as_object().expect("object");
        assert_eq!(object.len(), 1);
        assert_eq!(object["status"], "DONE");
    }

    #[test]
    fn mutation_outcome_ensure_reports_reasons() {
        let outcome = MutationOutcome {
            success: false,
            errors: Some(vec!["Task not found".to_string()]),
        };
        let err = outcome.ensure("updateTask").expect_err("rejected");
        assert!(err.to_string().contains("Task not found"));

        let ok = MutationOutcome {
            success: true,
            errors: None,
        };
        assert!(ok.ensure("updateTask").is_ok());
    }

    #[test]
    fn validate_email_accepts_plain_addresses() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("first.last+tag@sub.example.com").is_ok());
        assert!(validate_email("nope").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a b@c.com").is_err());
        assert!(validate_email("a@.com").is_err());
    }

    #[test]
    fn validate_title_trims_and_requires_two_chars() {
        assert_eq!(validate_title("  Fix sync  ").expect("title"), "Fix sync");
        assert!(validate_title("ab").is_ok());
        assert!(validate_title("x").is_err());
        assert!(validate_title("   ").is_err());
    }
}
