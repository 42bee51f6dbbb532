//! Health Check API Handler

use axum::{Json, extract::State};
use serde_json::{Value, json};

use super::AppState;

/// GET /health
/// Liveness probe; also reports how many runs the registry is tracking
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "trackedRuns": state.registry.len(),
    }))
}
