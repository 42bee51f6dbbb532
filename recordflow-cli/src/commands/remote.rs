//! Remote command handlers
//!
//! Queue runs on an orchestrator and inspect their status.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use recordflow_core::domain::run::{PipelineRun, RunStatus};
use recordflow_core::dto::run::QueuedRun;

use crate::api::ApiClient;
use crate::config::Config;

/// Trigger subcommands
#[derive(Subcommand)]
pub enum TriggerCommands {
    /// Queue the company description pipeline
    Company {
        #[arg(long)]
        record_id: String,

        #[arg(long)]
        name: String,
    },
    /// Queue the people and pets import pipeline
    People {
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Handle trigger commands
pub async fn handle_trigger_command(command: TriggerCommands, config: &Config) -> Result<()> {
    let client = ApiClient::new(&config.orchestrator_url);

    let queued = match command {
        TriggerCommands::Company { record_id, name } => {
            client.trigger_company(&record_id, &name).await?
        }
        TriggerCommands::People { text, file } => {
            let description = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path).with_context(|| {
                    format!("Failed to read description from {}", path.display())
                })?,
                (None, None) => anyhow::bail!("Either --text or --file is required"),
            };
            client.trigger_people(&description).await?
        }
    };

    print_queued(&queued);
    Ok(())
}

/// Show a run's status
pub async fn show_status(run_id: &str, config: &Config) -> Result<()> {
    let client = ApiClient::new(&config.orchestrator_url);
    let run = client.get_run(run_id).await?;

    print_run_details(&run);
    Ok(())
}

fn print_queued(queued: &QueuedRun) {
    println!("{} Run queued", "✓".green());
    println!("  Run ID: {}", queued.run_id.cyan());
    println!(
        "  {}",
        format!("recordflow status {}", queued.run_id).dimmed()
    );
}

/// Print detailed run information
fn print_run_details(run: &PipelineRun) {
    println!("{}", "Run Details:".bold());
    println!("  ID:          {}", run.id.cyan());
    println!("  Pipeline:    {}", run.pipeline_id);
    println!("  Status:      {}", colorize_status(&run.status));

    if let Some(stage) = &run.stage_id {
        let position = run.stage_index.map(|i| i + 1).unwrap_or_default();
        println!("  Stage:       {} (#{})", stage, position);
    }

    println!(
        "  Created:     {}",
        run.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    if let Some(started) = run.started_at {
        println!("  Started:     {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(completed) = run.completed_at {
        println!("  Completed:   {}", completed.format("%Y-%m-%d %H:%M:%S"));

        if let Some(started) = run.started_at {
            let duration = completed.signed_duration_since(started);
            println!("  Duration:    {}s", duration.num_seconds());
        }
    }

    if let Some(error) = &run.error {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }
}

/// Colorize run status for display
fn colorize_status(status: &RunStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        RunStatus::Pending => status_str.yellow(),
        RunStatus::Running => status_str.cyan(),
        RunStatus::Succeeded => status_str.green(),
        RunStatus::Failed => status_str.red(),
    }
}
