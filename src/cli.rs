use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "linkledger")]
#[command(about = "Tracks broken-link reports and what broke since the last run")]
#[command(version)]
pub struct Cli {
    /// Database file (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Show debug-level logging
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a new broken-link report
    Ingest(IngestArgs),

    /// Display a stored report, or list all of them
    Report(ReportArgs),

    /// Compare the two most recent reports
    Diff(DiffArgs),

    /// Delete a single report and its links
    Delete(DeleteArgs),

    /// Remove every stored report
    Clear(ClearArgs),
}

#[derive(Parser)]
pub struct IngestArgs {
    /// Path to the report JSON, or '-' to read from stdin
    pub input: String,
}

#[derive(Parser)]
pub struct ReportArgs {
    /// Show a specific report by id (defaults to the most recent)
    #[arg(long)]
    pub id: Option<String>,

    /// List all stored reports instead of showing one
    #[arg(long, default_value_t = false)]
    pub list: bool,

    /// Output as CSV
    #[arg(long, default_value_t = false)]
    pub csv: bool,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct DiffArgs {
    /// Output as CSV
    #[arg(long, default_value_t = false)]
    pub csv: bool,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct DeleteArgs {
    /// Report id to delete
    pub id: String,
}

#[derive(Parser)]
pub struct ClearArgs {
    /// Skip confirmation and wipe everything
    #[arg(long, default_value_t = false)]
    pub yes: bool,
}
