//! Pipeline run domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One execution of a pipeline
///
/// Created when a run is requested, mutated by the runner as stages
/// start and finish. Nothing outlives the process; the orchestrator keeps a
/// bounded in-memory history for status polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub id: String,
    pub pipeline_id: String,
    pub status: RunStatus,
    /// Zero-based index of the stage currently (or last) executing
    pub stage_index: Option<usize>,
    pub stage_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Run execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Succeeded | RunStatus::Failed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

impl PipelineRun {
    /// Creates a pending run with a fresh identifier
    pub fn new(pipeline_id: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), pipeline_id)
    }

    /// Creates a pending run with a caller-chosen identifier
    pub fn with_id(id: impl Into<String>, pipeline_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pipeline_id: pipeline_id.into(),
            status: RunStatus::Pending,
            stage_index: None,
            stage_id: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn enter_stage(&mut self, index: usize, stage_id: &str) {
        self.stage_index = Some(index);
        self.stage_id = Some(stage_id.to_string());
    }

    pub fn succeed(&mut self) {
        self.status = RunStatus::Succeeded;
        self.completed_at = Some(Utc::now());
    }

    /// Marks the run as failed; the current stage fields are left pointing
    /// at the stage that failed
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
    }
}
