//! pmb project command implementations.

use chrono::NaiveDate;

use crate::cli::load_context;
use crate::client::Gateway;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::types::{NewProjectInput, Project, ProjectChanges, ProjectStatus};

pub struct ListOptions {
    pub status: Option<String>,
    pub endpoint: Option<String>,
    pub org: Option<String>,
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
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub due: Option<String>,
    pub endpoint: Option<String>,
    pub org: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
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

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, options.org)?;
    let status = match options.status.as_deref() {
        Some(value) => Some(ProjectStatus::parse(value)?),
        None => None,
    };
    let projects = ctx.client.projects(&ctx.organization, status)?;

    let output = ProjectListOutput {
        organization: ctx.organization.clone(),
        total: projects.len(),
        projects: projects.clone(),
    };

    let mut human = HumanOutput::new("Projects");
    human.push_summary("Organization", ctx.organization.clone());
    human.push_summary("Total", projects.len().to_string());
    for project in &projects {
        human.push_detail(format!(
            "[{}] {} {} ({}/{} tasks)",
            project.status,
            project.id,
            project.name,
            project.completed_task_count,
            project.task_count
        ));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "project list",
        &output,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    let project = ctx.client.project(&options.id)?;

    let mut human = HumanOutput::new(format!("Project {}", project.id));
    human.push_summary("Name", project.name.clone());
    human.push_summary("Status", project.status.label().to_string());
    if let Some(org) = project.organization.as_ref() {
        human.push_summary("Organization", org.slug.clone());
    }
    if let Some(due) = project.due_date {
        human.push_summary("Due", due.format("%Y-%m-%d").to_string());
    }
    human.push_summary(
        "Tasks",
        format!("{}/{}", project.completed_task_count, project.task_count),
    );
    human.push_summary("Completion", format!("{}%", project.completion_rate));
    if !project.description.trim().is_empty() {
        human.push_detail(project.description.clone());
    }
    human.push_next_step(format!("pmb task list --project {}", project.id));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "project show",
        &project,
        Some(&human),
    )
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, options.org)?;
    let name = options.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument("name cannot be empty".to_string()));
    }
    let status = match options.status.as_deref() {
        Some(value) => Some(ProjectStatus::parse(value)?),
        None => None,
    };
    let due_date = match options.due.as_deref() {
        Some(value) => Some(parse_due_date(value)?),
        None => None,
    };

    let input = NewProjectInput {
        organization_slug: ctx.organization.clone(),
        name: name.to_string(),
        description: options.description,
        status,
        due_date,
    };
    let project = ctx.client.create_project(&input)?;

    let mut human = HumanOutput::new("Project created");
    human.push_summary("ID", project.id.clone());
    human.push_summary("Name", project.name.clone());
    human.push_summary("Organization", ctx.organization);
    human.push_next_step(format!("pmb task new <title> --project {}", project.id));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "project new",
        &project,
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;

    let mut changes = ProjectChanges::default();
    if let Some(name) = options.name {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("name cannot be empty".to_string()));
        }
        changes.name = Some(trimmed.to_string());
    }
    if let Some(description) = options.description {
        changes.description = Some(description);
    }
    if let Some(status) = options.status.as_deref() {
        changes.status = Some(ProjectStatus::parse(status)?);
    }
    if let Some(due) = options.due.as_deref() {
        changes.due_date = Some(parse_due_date(due)?);
    }
    if changes.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change (pass --name, --description, --status or --due)".to_string(),
        ));
    }

    let project = ctx.client.update_project(&options.id, &changes)?;

    let mut human = HumanOutput::new("Project updated");
    human.push_summary("ID", project.id.clone());
    human.push_summary("Name", project.name.clone());
    human.push_summary("Status", project.status.label().to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "project edit",
        &project,
        Some(&human),
    )
}

pub fn run_delete(options: DeleteOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    // Resolve first so the summary can name what was removed.
    let project = ctx.client.project(&options.id)?;
    ctx.client.delete_project(&project.id)?;

    let output = ProjectDeleteOutput {
        id: project.id.clone(),
        name: project.name.clone(),
    };

    let mut human = HumanOutput::new("Project deleted");
    human.push_summary("ID", project.id);
    human.push_summary("Name", project.name);
    human.push_warning("Tasks and comments in the project were removed with it.".to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "project delete",
        &output,
        Some(&human),
    )
}

fn parse_due_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        Error::InvalidArgument(format!("invalid due date '{}' (expected YYYY-MM-DD)", value))
    })
}

#[derive(serde::Serialize)]
struct ProjectListOutput {
    organization: String,
    total: usize,
    projects: Vec<Project>,
}

#[derive(serde::Serialize)]
struct ProjectDeleteOutput {
    id: String,
    name: String,
}
