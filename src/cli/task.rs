//! pmb task command implementations.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::cli::load_context;
use crate::client::Gateway;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::types::{
    validate_email, validate_title, NewTaskInput, Task, TaskChanges, TaskComment, TaskPriority,
    TaskStatus,
};

pub struct ListOptions {
    pub project: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub endpoint: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: String,
    pub endpoint: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct NewOptions {
    pub title: String,
    pub project: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub due: Option<String>,
    pub endpoint: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub due: Option<String>,
    pub endpoint: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct DeleteOptions {
    pub id: String,
    pub endpoint: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct StatusOptions {
    pub id: String,
    pub status: String,
    /// Envelope command name; `task move` reuses this runner.
    pub command: &'static str,
    pub endpoint: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    let status = match options.status.as_deref() {
        Some(value) => Some(TaskStatus::parse(value)?),
        None => None,
    };
    let priority = match options.priority.as_deref() {
        Some(value) => Some(TaskPriority::parse(value)?),
        None => None,
    };
    let tasks = ctx.client.tasks(&options.project, status, priority)?;

    let output = TaskListOutput {
        project: options.project.clone(),
        total: tasks.len(),
        tasks: tasks.clone(),
    };

    let now = Utc::now();
    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Project", options.project.clone());
    human.push_summary("Total", tasks.len().to_string());
    for task in &tasks {
        let mut line = format!(
            "[{}][{}] {} {}",
            task.status, task.priority, task.id, task.title
        );
        if let Some(assignee) = task.assignee_email.as_ref() {
            line.push_str(&format!(" ({})", assignee));
        }
        if task.is_overdue(now) {
            line.push_str(" (overdue)");
        }
        human.push_detail(line);
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task list",
        &output,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    let task = ctx.client.task(&options.id)?;
    let comments = ctx.client.task_comments(&task.id)?;

    let mut human = HumanOutput::new(format!("Task {}", task.id));
    human.push_summary("Title", task.title.clone());
    human.push_summary("Status", task.status.label().to_string());
    human.push_summary("Priority", task.priority.label().to_string());
    if let Some(project) = task.project.as_ref() {
        human.push_summary("Project", project.name.clone());
    }
    if let Some(assignee) = task.assignee_email.as_ref() {
        human.push_summary("Assignee", assignee.clone());
    }
    if let Some(due) = task.due_date {
        let mut line = due.format("%Y-%m-%d").to_string();
        if task.is_overdue(Utc::now()) {
            line.push_str(" (overdue)");
        }
        human.push_summary("Due", line);
    }
    human.push_summary(
        "Created",
        task.created_at.format("%Y-%m-%d %H:%M").to_string(),
    );
    if !task.description.trim().is_empty() {
        human.push_detail(task.description.clone());
    }
    for comment in &comments {
        human.push_detail(format!(
            "comment {} [{}] {}: {}",
            comment.id,
            comment.created_at.format("%Y-%m-%d %H:%M"),
            comment.author_email,
            comment.content
        ));
    }

    let output = TaskShowOutput { task, comments };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task show",
        &output,
        Some(&human),
    )
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    let title = validate_title(&options.title)?;
    let priority = match options.priority.as_deref() {
        Some(value) => Some(TaskPriority::parse(value)?),
        None => None,
    };
    if let Some(assignee) = options.assignee.as_deref() {
        validate_email(assignee)?;
    }
    let due_date = match options.due.as_deref() {
        Some(value) => Some(parse_due_timestamp(value)?),
        None => None,
    };

    let input = NewTaskInput {
        project_id: options.project.clone(),
        title,
        description: options.description,
        status: None,
        priority,
        assignee_email: options.assignee,
        due_date,
    };
    let task = ctx.client.create_task(&input)?;

    let mut human = HumanOutput::new("Task created");
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Status", task.status.label().to_string());
    human.push_next_step(format!("pmb board --project {}", options.project));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task new",
        &task,
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;

    let mut changes = TaskChanges::default();
    if let Some(title) = options.title.as_deref() {
        changes.title = Some(validate_title(title)?);
    }
    if let Some(description) = options.description {
        changes.description = Some(description);
    }
    if let Some(priority) = options.priority.as_deref() {
        changes.priority = Some(TaskPriority::parse(priority)?);
    }
    if let Some(assignee) = options.assignee {
        // An empty string clears the assignee server-side.
        if !assignee.trim().is_empty() {
            validate_email(&assignee)?;
        }
        changes.assignee_email = Some(assignee.trim().to_string());
    }
    if let Some(due) = options.due.as_deref() {
        changes.due_date = Some(parse_due_timestamp(due)?);
    }
    if changes.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change (pass --title, --description, --priority, --assignee or --due)"
                .to_string(),
        ));
    }

    let task = ctx.client.update_task(&options.id, &changes)?;

    let mut human = HumanOutput::new("Task updated");
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Priority", task.priority.label().to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task edit",
        &task,
        Some(&human),
    )
}

pub fn run_delete(options: DeleteOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    let task = ctx.client.task(&options.id)?;
    ctx.client.delete_task(&task.id)?;

    let output = TaskDeleteOutput {
        id: task.id.clone(),
        title: task.title.clone(),
    };

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", task.id);
    human.push_summary("Title", task.title);
    if task.comment_count > 0 {
        human.push_warning(format!(
            "{} comment(s) were removed with it",
            task.comment_count
        ));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task delete",
        &output,
        Some(&human),
    )
}

pub fn run_status(options: StatusOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    let to = TaskStatus::parse(&options.status)?;
    let task = ctx.client.task(&options.id)?;
    let from = task.status;

    // Same target as current: report without issuing an update, the way
    // the board treats a drop on the card's own column.
    if from == to {
        let output = TaskStatusOutput {
            id: task.id.clone(),
            from,
            to,
            changed: false,
        };
        let mut human = HumanOutput::new("Task status unchanged");
        human.push_summary("ID", task.id);
        human.push_summary("Status", from.to_string());
        return emit_success(
            OutputOptions {
                json: options.json,
                quiet: options.quiet,
            },
            options.command,
            &output,
            Some(&human),
        );
    }

    let updated = ctx.client.update_task(&task.id, &TaskChanges::status_only(to))?;

    let output = TaskStatusOutput {
        id: updated.id.clone(),
        from,
        to: updated.status,
        changed: true,
    };

    let mut human = HumanOutput::new("Task status updated");
    human.push_summary("ID", updated.id);
    human.push_summary("Transition", format!("{} -> {}", from, updated.status));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        options.command,
        &output,
        Some(&human),
    )
}

/// Task due dates are full timestamps on the wire; a calendar day from the
/// command line becomes midnight UTC.
fn parse_due_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        Error::InvalidArgument(format!("invalid due date '{}' (expected YYYY-MM-DD)", value))
    })?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

#[derive(serde::Serialize)]
struct TaskListOutput {
    project: String,
    total: usize,
    tasks: Vec<Task>,
}

#[derive(serde::Serialize)]
struct TaskShowOutput {
    task: Task,
    comments: Vec<TaskComment>,
}

#[derive(serde::Serialize)]
struct TaskDeleteOutput {
    id: String,
    title: String,
}

#[derive(serde::Serialize)]
struct TaskStatusOutput {
    id: String,
    from: TaskStatus,
    to: TaskStatus,
    changed: bool,
}
