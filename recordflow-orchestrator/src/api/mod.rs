//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod run;
pub mod trigger;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::service::{Dispatcher, RunRegistry};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub registry: Arc<RunRegistry>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Triggers
        .route("/airtable/company-created", post(trigger::company_created))
        .route("/people/import", post(trigger::people_import))
        // Run status
        .route("/runs/{id}", get(run::get_run))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
