//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Caredesk using clap.
//!
//! Exit codes:
//! - `0` success
//! - `1` the request was refused (for example a pre-auth that cannot be submitted)
//! - `2` configuration error
//! - `3` the tracked job failed or never finished
//! - `4` interrupted by Ctrl+C / SIGTERM
//! - `5` fatal error

pub mod commands;
pub mod panel;

use clap::{Parser, Subcommand};

/// Caredesk - clinical workstation session orchestrator
#[derive(Parser, Debug)]
#[command(name = "caredesk")]
#[command(version, about, long_about = None)]
#[command(author = "Caredesk Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "caredesk.toml", env = "CAREDESK_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CAREDESK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or change the persisted session context
    Context(commands::context::ContextArgs),

    /// Poll a job until it reaches a terminal status
    WatchJob(commands::watch::WatchJobArgs),

    /// Submit or resubmit a pre-authorization and track its job
    SubmitPreauth(commands::submit::SubmitArgs),

    /// Render a page against the current context
    Page(commands::page::PageArgs),

    /// Check whether a module can mount against the current context
    Resolve(commands::resolve::ResolveArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
