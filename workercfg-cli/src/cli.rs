//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{CompletionsCommand, EnvsCommand, ShowCommand, ValidateCommand};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for validating worker deployment configuration.
#[derive(Parser)]
#[command(name = "workercfg")]
#[command(
    version,
    about = "Validate and inspect worker deployment configuration",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Configuration file (discovered from the working directory by default)
    #[arg(long, value_name = "PATH", global = true, env = "WORKERCFG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Named environment to resolve
    #[arg(
        long = "env",
        value_name = "NAME",
        global = true,
        env = "WORKERCFG_ENV"
    )]
    pub env_name: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Validate the configuration and report problems
    Validate(ValidateCommand),

    /// Print the normalized configuration
    Show(ShowCommand),

    /// List the named environments
    Envs(EnvsCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
