//! RecordFlow CLI
//!
//! Runs the enrichment pipelines locally, or queues them on an orchestrator
//! and reports their status.

mod api;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "recordflow")]
#[command(about = "Company and people enrichment pipelines for Airtable", long_about = None)]
struct Cli {
    /// Orchestrator URL
    #[arg(
        long,
        env = "RECORDFLOW_ORCHESTRATOR_URL",
        default_value = "http://localhost:8080"
    )]
    orchestrator_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "recordflow_cli=info,recordflow_runner=info,recordflow_agents=warn".into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        orchestrator_url: cli.orchestrator_url,
    };

    handle_command(cli.command, &config).await
}
