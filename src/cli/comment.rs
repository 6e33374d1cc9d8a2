//! pmb comment command implementations.

use crate::cli::load_context;
use crate::client::Gateway;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::types::{validate_email, TaskComment};

pub struct ListOptions {
    pub task: String,
    pub endpoint: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct AddOptions {
    pub text: String,
    pub task: String,
    pub author: Option<String>,
    pub endpoint: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub text: String,
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

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    let comments = ctx.client.task_comments(&options.task)?;

    let output = CommentListOutput {
        task: options.task.clone(),
        total: comments.len(),
        comments: comments.clone(),
    };

    let mut human = HumanOutput::new("Comments");
    human.push_summary("Task", options.task.clone());
    human.push_summary("Total", comments.len().to_string());
    for comment in &comments {
        human.push_detail(format!(
            "{} [{}] {}: {}",
            comment.id,
            comment.created_at.format("%Y-%m-%d %H:%M"),
            comment.author_email,
            comment.content
        ));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "comment list",
        &output,
        Some(&human),
    )
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    let text = options.text.trim();
    if text.is_empty() {
        return Err(Error::InvalidArgument(
            "comment cannot be empty".to_string(),
        ));
    }
    let author = options
        .author
        .or_else(|| ctx.config.ui.author_email.clone())
        .ok_or_else(|| {
            Error::InvalidArgument(
                "no author email (pass --author or set ui.author_email in the config)".to_string(),
            )
        })?;
    validate_email(&author)?;

    let comment = ctx.client.add_comment(&options.task, text, author.trim())?;

    let mut human = HumanOutput::new("Comment added");
    human.push_summary("ID", comment.id.clone());
    human.push_summary("Task", options.task);
    human.push_summary("Author", comment.author_email.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "comment add",
        &comment,
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    let text = options.text.trim();
    if text.is_empty() {
        return Err(Error::InvalidArgument(
            "comment cannot be empty".to_string(),
        ));
    }

    let comment = ctx.client.update_comment(&options.id, text)?;

    let mut human = HumanOutput::new("Comment updated");
    human.push_summary("ID", comment.id.clone());
    human.push_summary("Author", comment.author_email.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "comment edit",
        &comment,
        Some(&human),
    )
}

pub fn run_delete(options: DeleteOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    ctx.client.delete_comment(&options.id)?;

    let output = CommentDeleteOutput {
        id: options.id.clone(),
    };

    let mut human = HumanOutput::new("Comment deleted");
    human.push_summary("ID", options.id);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "comment delete",
        &output,
        Some(&human),
    )
}

#[derive(serde::Serialize)]
struct CommentListOutput {
    task: String,
    total: usize,
    comments: Vec<TaskComment>,
}

#[derive(serde::Serialize)]
struct CommentDeleteOutput {
    id: String,
}
