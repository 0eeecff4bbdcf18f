//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    cleanup::CleanupArgs, completions::CompletionsArgs, dupes::DupesArgs, init::InitArgs,
    list::ListArgs, migrate::MigrateArgs, new::NewArgs, remove::RemoveArgs,
    schema::SchemaCommands, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "codex")]
#[command(author, version, about = "Character Codex")]
#[command(
    long_about = "Schema, validation and catalog tooling for a static site's character records."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .codex/)
    #[arg(long, global = true, env = "CODEX_PROJECT")]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new codex project
    Init(InitArgs),

    /// Validate records against their schema
    Validate(ValidateArgs),

    /// Rewrite legacy (v1) records in the current schema
    Migrate(MigrateArgs),

    /// Write a new record for an image
    New(NewArgs),

    /// List records
    List(ListArgs),

    /// Show catalog progress
    Status,

    /// Print the next image that has no record
    Next,

    /// Delete records whose image is gone
    Cleanup(CleanupArgs),

    /// Find byte-identical images
    Dupes(DupesArgs),

    /// Delete an image and its record
    Remove(RemoveArgs),

    /// Inspect collections and schemas
    #[command(subcommand)]
    Schema(SchemaCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for terminals)
    #[default]
    Auto,
    /// Human-readable table
    Table,
    /// JSON format (for programming)
    Json,
    /// Tab-separated values (for piping)
    Tsv,
    /// Just IDs, one per line
    Id,
}
