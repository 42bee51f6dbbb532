//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod local;
mod remote;

pub use remote::TriggerCommands;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Research, polish and store a company description (runs locally)
    Company {
        /// Record id of the company in Airtable
        #[arg(long)]
        record_id: String,

        /// Company name to research
        #[arg(long)]
        name: String,

        /// Keep records in memory instead of writing to Airtable
        #[arg(long)]
        dry_run: bool,
    },
    /// Extract people and pets from text and create their records (runs locally)
    People {
        /// Description text
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// File containing the description text
        #[arg(long)]
        file: Option<PathBuf>,

        /// Keep records in memory instead of writing to Airtable
        #[arg(long)]
        dry_run: bool,
    },
    /// Queue a run on a remote orchestrator
    Trigger {
        #[command(subcommand)]
        command: TriggerCommands,
    },
    /// Show the status of a run on a remote orchestrator
    Status {
        /// Run ID returned by a trigger
        run_id: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Company {
            record_id,
            name,
            dry_run,
        } => local::run_company(record_id, name, dry_run).await,
        Commands::People {
            text,
            file,
            dry_run,
        } => local::run_people(text, file, dry_run).await,
        Commands::Trigger { command } => remote::handle_trigger_command(command, config).await,
        Commands::Status { run_id } => remote::show_status(&run_id, config).await,
    }
}
