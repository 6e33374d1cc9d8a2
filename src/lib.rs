//! pmb - Project Management Board
//!
//! This library backs the pmb CLI and its interactive board: a terminal
//! client for a project-management service exposing organizations,
//! projects, tasks and comments over a GraphQL gateway.
//!
//! # Core Concepts
//!
//! - **Gateway**: one trait over every remote query and mutation, with a
//!   blocking GraphQL client as the production implementation
//! - **Board**: four fixed status columns (To Do, In Progress, Done,
//!   Blocked) with pick-up-and-drop moves between them
//! - **Session**: the current organization slug, remembered across runs
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `client`: GraphQL gateway client and the `Gateway` trait
//! - `config`: Configuration loading from the platform config dir
//! - `error`: Error types and result aliases
//! - `output`: JSON envelope and human-readable command output
//! - `session`: Current-organization state in the platform data dir
//! - `types`: Domain entities and wire-facing input types
//! - `ui`: Interactive task board built on ratatui

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod session;
pub mod types;
pub mod ui;

pub use error::{Error, Result};
