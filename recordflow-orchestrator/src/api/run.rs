//! Run status API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use recordflow_core::domain::run::PipelineRun;

use super::AppState;
use crate::api::error::{ApiError, ApiResult};

/// GET /runs/{id}
/// Latest snapshot of a run, while it is still in the registry
pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PipelineRun>> {
    tracing::debug!("Getting run: {}", id);

    state
        .registry
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Run {} not found", id)))
}
