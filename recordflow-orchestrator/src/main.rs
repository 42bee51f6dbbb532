//! RecordFlow Orchestrator
//!
//! HTTP front door for the pipelines. Webhooks queue a run and return at
//! once; a dispatcher task executes queued runs in the background and the
//! run registry serves their status.

use std::sync::Arc;

use anyhow::{Context, Result};
use recordflow_runner::{Collaborators, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod service;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::service::{Dispatcher, Pipelines, RunRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "recordflow_orchestrator=debug,recordflow_runner=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting RecordFlow Orchestrator...");

    let server = ServerConfig::from_env()?;
    server.validate()?;

    let config = Config::from_env().context("Failed to load pipeline configuration")?;
    config.validate()?;

    tracing::info!(
        "Loaded configuration: airtable_base={}, research_model={}, openai_model={}",
        config.airtable_base_id,
        config.gemini_model,
        config.openai_model
    );

    let pipelines = Arc::new(Pipelines::from_collaborators(&Collaborators::from_config(
        &config,
    )));
    let registry = Arc::new(RunRegistry::new(server.run_history));
    let dispatcher = Dispatcher::start(
        pipelines,
        registry.clone(),
        server.queue_capacity,
        server.max_concurrent_runs,
    );

    tracing::info!(
        "Dispatcher ready (queue capacity: {}, max concurrent runs: {})",
        server.queue_capacity,
        server.max_concurrent_runs
    );

    // Build router with all API endpoints
    let app = api::create_router(AppState {
        dispatcher: Arc::new(dispatcher),
        registry,
    });

    tracing::info!("Listening on {}", server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
