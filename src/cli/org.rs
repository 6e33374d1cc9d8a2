//! pmb org command implementations.

use crate::cli::load_context;
use crate::client::Gateway;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::types::{validate_email, NewOrganizationInput, Organization, OrganizationChanges};

pub struct ListOptions {
    pub endpoint: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub slug: Option<String>,
    pub endpoint: Option<String>,
    pub org: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct UseOptions {
    pub slug: String,
    pub endpoint: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct NewOptions {
    pub name: String,
    pub email: String,
    pub slug: Option<String>,
    pub endpoint: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub endpoint: Option<String>,
    pub org: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    let organizations = ctx.client.organizations()?;

    let output = OrgListOutput {
        total: organizations.len(),
        organizations: organizations.clone(),
    };

    let mut human = HumanOutput::new("Organizations");
    human.push_summary("Total", organizations.len().to_string());
    for org in &organizations {
        human.push_detail(format!(
            "{}  {} ({} projects)",
            org.slug, org.name, org.project_count
        ));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "org list",
        &output,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, options.org)?;
    let slug = options.slug.unwrap_or_else(|| ctx.organization.clone());
    let organization = ctx.client.organization(&slug)?;

    let mut human = HumanOutput::new(format!("Organization {}", organization.slug));
    human.push_summary("Name", organization.name.clone());
    human.push_summary("Slug", organization.slug.clone());
    human.push_summary("Contact", organization.contact_email.clone());
    human.push_summary("Projects", organization.project_count.to_string());
    human.push_summary(
        "Created",
        organization.created_at.format("%Y-%m-%d").to_string(),
    );

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "org show",
        &organization,
        Some(&human),
    )
}

pub fn run_use(options: UseOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    // Look the slug up remotely before persisting it.
    let organization = ctx.client.organization(&options.slug)?;
    ctx.session.set_current_org(&organization.slug)?;

    let output = OrgUseOutput {
        slug: organization.slug.clone(),
        name: organization.name.clone(),
    };

    let mut human = HumanOutput::new("Organization selected");
    human.push_summary("Slug", organization.slug);
    human.push_summary("Name", organization.name);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "org use",
        &output,
        Some(&human),
    )
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, None)?;
    let name = options.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument("name cannot be empty".to_string()));
    }
    validate_email(&options.email)?;

    let input = NewOrganizationInput {
        name: name.to_string(),
        contact_email: options.email.trim().to_string(),
        slug: options.slug,
    };
    let organization = ctx.client.create_organization(&input)?;

    let mut human = HumanOutput::new("Organization created");
    human.push_summary("Slug", organization.slug.clone());
    human.push_summary("Name", organization.name.clone());
    human.push_next_step(format!("pmb org use {}", organization.slug));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "org new",
        &organization,
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let ctx = load_context(options.endpoint, options.org)?;
    let slug = options.slug.unwrap_or_else(|| ctx.organization.clone());

    let mut changes = OrganizationChanges::default();
    if let Some(name) = options.name {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("name cannot be empty".to_string()));
        }
        changes.name = Some(trimmed.to_string());
    }
    if let Some(email) = options.email {
        validate_email(&email)?;
        changes.contact_email = Some(email.trim().to_string());
    }
    if changes.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change (pass --name or --email)".to_string(),
        ));
    }

    // Mutations address organizations by id, queries by slug.
    let current = ctx.client.organization(&slug)?;
    let organization = ctx.client.update_organization(&current.id, &changes)?;

    let mut human = HumanOutput::new("Organization updated");
    human.push_summary("Slug", organization.slug.clone());
    human.push_summary("Name", organization.name.clone());
    human.push_summary("Contact", organization.contact_email.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "org edit",
        &organization,
        Some(&human),
    )
}

#[derive(serde::Serialize)]
struct OrgListOutput {
    total: usize,
    organizations: Vec<Organization>,
}

#[derive(serde::Serialize)]
struct OrgUseOutput {
    slug: String,
    name: String,
}
