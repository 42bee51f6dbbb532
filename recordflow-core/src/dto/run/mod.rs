//! Run DTOs

use serde::{Deserialize, Serialize};

/// Acknowledgement returned when a run has been queued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedRun {
    /// Always `"queued"`
    pub status: String,
    pub run_id: String,
}

impl QueuedRun {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            status: "queued".to_string(),
            run_id: run_id.into(),
        }
    }
}

/// Error body returned by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
