//! pmb stats command implementations.

use crate::cli::load_context;
use crate::client::Gateway;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct OrgOptions {
    pub slug: Option<String>,
    pub endpoint: Option<String>,
    pub org: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ProjectOptions {
    pub id: String,
    pub endpoint: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run_org(options: OrgOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, options.org)?;
    let slug = options.slug.unwrap_or_else(|| ctx.organization.clone());
    let stats = ctx.client.organization_stats(&slug)?;

    let mut human = HumanOutput::new(format!("Stats for {}", stats.organization_name));
    human.push_summary(
        "Projects",
        format!(
            "{} ({} active, {} completed)",
            stats.total_projects, stats.active_projects, stats.completed_projects
        ),
    );
    human.push_summary(
        "Tasks",
        format!("{}/{} completed", stats.completed_tasks, stats.total_tasks),
    );
    human.push_summary("Completion", format!("{}%", stats.overall_completion_rate));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "stats org",
        &stats,
        Some(&human),
    )
}

pub fn run_project(options: ProjectOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    let stats = ctx.client.project_stats(&options.id)?;

    let mut human = HumanOutput::new(format!("Stats for {}", stats.project_name));
    human.push_summary("Total tasks", stats.total_tasks.to_string());
    human.push_summary("To do", stats.todo_tasks.to_string());
    human.push_summary("In progress", stats.in_progress_tasks.to_string());
    human.push_summary("Done", stats.completed_tasks.to_string());
    human.push_summary("Blocked", stats.blocked_tasks.to_string());
    human.push_summary("Completion", format!("{}%", stats.completion_rate));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "stats project",
        &stats,
        Some(&human),
    )
}
