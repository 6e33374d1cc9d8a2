//! Command-line interface for pmb
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use clap::{Parser, Subcommand};

use crate::client::GraphQlClient;
use crate::config::Config;
use crate::error::Result;
use crate::session::SessionStore;

mod board;
mod comment;
mod org;
mod project;
mod stats;
mod task;

/// pmb - Project Management Board
///
/// A terminal client for a project-management service: organizations,
/// projects, tasks and comments over a GraphQL gateway, plus an
/// interactive board for moving tasks between status columns.
#[derive(Parser, Debug)]
#[command(name = "pmb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// GraphQL endpoint URL (overrides the config file)
    #[arg(long, global = true, env = "PMB_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Organization slug (overrides the remembered one)
    #[arg(long, global = true, env = "PMB_ORG")]
    pub org: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Organization management
    #[command(subcommand)]
    Org(OrgCommands),

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Comments on tasks
    #[command(subcommand)]
    Comment(CommentCommands),

    /// Completion statistics
    #[command(subcommand)]
    Stats(StatsCommands),

    /// Open the interactive task board
    Board {
        /// Project to open (skips the project picker)
        #[arg(long)]
        project: Option<String>,
    },
}

/// Organization subcommands
#[derive(Subcommand, Debug)]
pub enum OrgCommands {
    /// List organizations
    List,

    /// Show one organization
    Show {
        /// Organization slug (defaults to the current one)
        slug: Option<String>,
    },

    /// Remember an organization as the current one
    Use {
        /// Organization slug
        slug: String,
    },

    /// Create an organization
    New {
        /// Organization name
        name: String,

        /// Contact email
        #[arg(long)]
        email: String,

        /// Slug (the server derives one from the name when omitted)
        #[arg(long)]
        slug: Option<String>,
    },

    /// Edit an organization
    Edit {
        /// Organization slug (defaults to the current one)
        slug: Option<String>,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New contact email
        #[arg(long)]
        email: Option<String>,
    },
}

/// Project subcommands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List projects in the current organization
    List {
        /// Filter by status: active, completed, on-hold, cancelled
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one project
    Show {
        /// Project id
        id: String,
    },

    /// Create a project in the current organization
    New {
        /// Project name
        name: String,

        /// Description
        #[arg(long)]
        description: Option<String>,

        /// Initial status: active, completed, on-hold, cancelled
        #[arg(long)]
        status: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },

    /// Edit a project
    Edit {
        /// Project id
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New status: active, completed, on-hold, cancelled
        #[arg(long)]
        status: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },

    /// Delete a project and everything in it
    Delete {
        /// Project id
        id: String,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks in a project
    List {
        /// Project id
        #[arg(long)]
        project: String,

        /// Filter by status: todo, in-progress, done, blocked
        #[arg(long)]
        status: Option<String>,

        /// Filter by priority: low, medium, high, urgent
        #[arg(long)]
        priority: Option<String>,
    },

    /// Show one task with its comments
    Show {
        /// Task id
        id: String,
    },

    /// Create a task
    New {
        /// Task title
        title: String,

        /// Project id
        #[arg(long)]
        project: String,

        /// Description
        #[arg(long)]
        description: Option<String>,

        /// Priority: low, medium, high, urgent
        #[arg(long)]
        priority: Option<String>,

        /// Assignee email
        #[arg(long)]
        assignee: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },

    /// Edit a task
    Edit {
        /// Task id
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New priority: low, medium, high, urgent
        #[arg(long)]
        priority: Option<String>,

        /// New assignee email (empty string unassigns)
        #[arg(long)]
        assignee: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },

    /// Delete a task and its comments
    Delete {
        /// Task id
        id: String,
    },

    /// Set a task's status
    Status {
        /// Task id
        id: String,

        /// New status: todo, in-progress, done, blocked
        status: String,
    },

    /// Move a task to a board column (alias for status)
    Move {
        /// Task id
        id: String,

        /// Target column: todo, in-progress, done, blocked
        status: String,
    },
}

/// Comment subcommands
#[derive(Subcommand, Debug)]
pub enum CommentCommands {
    /// List comments on a task
    List {
        /// Task id
        #[arg(long)]
        task: String,
    },

    /// Add a comment to a task
    Add {
        /// Comment text
        text: String,

        /// Task id
        #[arg(long)]
        task: String,

        /// Author email (defaults to ui.author_email from the config)
        #[arg(long)]
        author: Option<String>,
    },

    /// Edit a comment
    Edit {
        /// Comment id
        id: String,

        /// New text
        text: String,
    },

    /// Delete a comment
    Delete {
        /// Comment id
        id: String,
    },
}

/// Statistics subcommands
#[derive(Subcommand, Debug)]
pub enum StatsCommands {
    /// Organization-wide completion statistics
    Org {
        /// Organization slug (defaults to the current one)
        slug: Option<String>,
    },

    /// Per-project completion statistics
    Project {
        /// Project id
        id: String,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Org(cmd) => match cmd {
                OrgCommands::List => org::run_list(org::ListOptions {
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
                OrgCommands::Show { slug } => org::run_show(org::ShowOptions {
                    slug,
                    endpoint: self.endpoint,
                    org: self.org,
                    json: self.json,
                    quiet: self.quiet,
                }),
                OrgCommands::Use { slug } => org::run_use(org::UseOptions {
                    slug,
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
                OrgCommands::New { name, email, slug } => org::run_new(org::NewOptions {
                    name,
                    email,
                    slug,
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
                OrgCommands::Edit { slug, name, email } => org::run_edit(org::EditOptions {
                    slug,
                    name,
                    email,
                    endpoint: self.endpoint,
                    org: self.org,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Project(cmd) => match cmd {
                ProjectCommands::List { status } => project::run_list(project::ListOptions {
                    status,
                    endpoint: self.endpoint,
                    org: self.org,
                    json: self.json,
                    quiet: self.quiet,
                }),
                ProjectCommands::Show { id } => project::run_show(project::ShowOptions {
                    id,
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
                ProjectCommands::New {
                    name,
                    description,
                    status,
                    due,
                } => project::run_new(project::NewOptions {
                    name,
                    description,
                    status,
                    due,
                    endpoint: self.endpoint,
                    org: self.org,
                    json: self.json,
                    quiet: self.quiet,
                }),
                ProjectCommands::Edit {
                    id,
                    name,
                    description,
                    status,
                    due,
                } => project::run_edit(project::EditOptions {
                    id,
                    name,
                    description,
                    status,
                    due,
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
                ProjectCommands::Delete { id } => project::run_delete(project::DeleteOptions {
                    id,
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::List {
                    project,
                    status,
                    priority,
                } => task::run_list(task::ListOptions {
                    project,
                    status,
                    priority,
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Show { id } => task::run_show(task::ShowOptions {
                    id,
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::New {
                    title,
                    project,
                    description,
                    priority,
                    assignee,
                    due,
                } => task::run_new(task::NewOptions {
                    title,
                    project,
                    description,
                    priority,
                    assignee,
                    due,
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Edit {
                    id,
                    title,
                    description,
                    priority,
                    assignee,
                    due,
                } => task::run_edit(task::EditOptions {
                    id,
                    title,
                    description,
                    priority,
                    assignee,
                    due,
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Delete { id } => task::run_delete(task::DeleteOptions {
                    id,
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Status { id, status } => task::run_status(task::StatusOptions {
                    id,
                    status,
                    command: "task status",
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Move { id, status } => task::run_status(task::StatusOptions {
                    id,
                    status,
                    command: "task move",
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Comment(cmd) => match cmd {
                CommentCommands::List { task } => comment::run_list(comment::ListOptions {
                    task,
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
                CommentCommands::Add { text, task, author } => {
                    comment::run_add(comment::AddOptions {
                        text,
                        task,
                        author,
                        endpoint: self.endpoint,
                        json: self.json,
                        quiet: self.quiet,
                    })
                }
                CommentCommands::Edit { id, text } => comment::run_edit(comment::EditOptions {
                    id,
                    text,
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
                CommentCommands::Delete { id } => comment::run_delete(comment::DeleteOptions {
                    id,
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Stats(cmd) => match cmd {
                StatsCommands::Org { slug } => stats::run_org(stats::OrgOptions {
                    slug,
                    endpoint: self.endpoint,
                    org: self.org,
                    json: self.json,
                    quiet: self.quiet,
                }),
                StatsCommands::Project { id } => stats::run_project(stats::ProjectOptions {
                    id,
                    endpoint: self.endpoint,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Board { project } => board::run(board::BoardOptions {
                project,
                endpoint: self.endpoint,
                org: self.org,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}

/// Shared state for commands that talk to the remote service.
pub(crate) struct CommandContext {
    pub config: Config,
    pub session: SessionStore,
    pub organization: String,
    pub client: GraphQlClient,
}

/// Resolve config, session and organization for a command. The organization
/// comes from `--org` (or `PMB_ORG`) when given, then the session file, then
/// `ui.default_org` from the config.
pub(crate) fn load_context(
    endpoint: Option<String>,
    org: Option<String>,
) -> Result<CommandContext> {
    let mut config = Config::load_or_default(None);
    if let Some(endpoint) = endpoint {
        config.api.endpoint = endpoint;
    }
    config.validate()?;

    let session = SessionStore::open_default()?;
    let organization = match org {
        Some(slug) => slug,
        None => session.current_org(&config.ui.default_org),
    };
    let client = GraphQlClient::new(&config.api)?;

    Ok(CommandContext {
        config,
        session,
        organization,
        client,
    })
}
