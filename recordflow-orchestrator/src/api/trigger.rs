//! Trigger API Handlers
//!
//! Webhook endpoints that queue a pipeline run and acknowledge immediately.
//! The run's outcome is only visible in the logs and through `GET /runs/{id}`.

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use recordflow_core::dto::run::QueuedRun;
use recordflow_core::dto::trigger::{CompanyCreatedPayload, PeopleImportPayload};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::RunRequest;

const INVALID_JSON: &str = "Invalid JSON body";
const MISSING_COMPANY_FIELDS: &str = "Missing airtableRecordId or name in body";
const MISSING_DESCRIPTION: &str = "Missing description in body";

/// POST /airtable/company-created
/// Queue the company description pipeline for a new company record
pub async fn company_created(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<QueuedRun>)> {
    let payload: CompanyCreatedPayload = parse_body(&body, MISSING_COMPANY_FIELDS)?;
    let input = payload
        .into_input()
        .ok_or_else(|| ApiError::BadRequest(MISSING_COMPANY_FIELDS.to_string()))?;

    tracing::info!(
        "Company created webhook: record {} ({})",
        input.airtable_record_id,
        input.name
    );

    queue(&state, RunRequest::Company(input))
}

/// POST /people/import
/// Queue the people and pets import pipeline for a free-text description
pub async fn people_import(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<QueuedRun>)> {
    let payload: PeopleImportPayload = parse_body(&body, MISSING_DESCRIPTION)?;
    let input = payload
        .into_input()
        .ok_or_else(|| ApiError::BadRequest(MISSING_DESCRIPTION.to_string()))?;

    tracing::info!(
        "People import request ({} characters)",
        input.description.len()
    );

    queue(&state, RunRequest::People(input))
}

fn queue(state: &AppState, request: RunRequest) -> ApiResult<(StatusCode, Json<QueuedRun>)> {
    let pipeline_id = request.pipeline_id();
    let run_id = state.dispatcher.submit(request)?;

    tracing::info!("Queued run {} of pipeline '{}'", run_id, pipeline_id);

    Ok((StatusCode::ACCEPTED, Json(QueuedRun::new(run_id))))
}

/// Decode a JSON object body
///
/// `null` counts as an object without fields. Anything else that is not a
/// JSON object is an invalid body; an object whose fields have the wrong
/// type is reported like a missing field.
fn parse_body<T: DeserializeOwned>(body: &[u8], missing_fields: &str) -> ApiResult<T> {
    let mut value: Value =
        serde_json::from_slice(body).map_err(|_| ApiError::BadRequest(INVALID_JSON.to_string()))?;

    // A null body carries no fields
    if value.is_null() {
        value = Value::Object(Default::default());
    }

    if !value.is_object() {
        return Err(ApiError::BadRequest(INVALID_JSON.to_string()));
    }

    serde_json::from_value(value).map_err(|_| ApiError::BadRequest(missing_fields.to_string()))
}
