//! Stage contract

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::retry::CollaboratorError;
use crate::validate::{Validate, ValidationError};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One named transformation step
///
/// A stage must depend only on its input and on the responses of the
/// collaborators it calls. Side effects are allowed but the whole stage may
/// be re-run, so writes should be safe to repeat at stage granularity.
#[async_trait]
pub trait Stage: Send + Sync {
    type Input: Validate + Send + 'static;
    type Output: Validate + Send + 'static;

    /// Stable identifier used in logs and run records
    fn id(&self) -> &'static str;

    async fn execute(&self, input: Self::Input) -> Result<Self::Output, StageFailure>;
}

/// Why a stage failed
///
/// Stages return these as-is; nothing downgrades a failure to a default
/// value.
#[derive(Debug, Error)]
pub enum StageFailure {
    /// Input or output did not match the declared shape
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A collaborator (agent, record store) returned an error
    #[error("{collaborator} error: {source}")]
    Collaborator {
        collaborator: &'static str,
        #[source]
        source: BoxError,
    },

    /// Agent output could not be turned into the expected structure
    #[error("extraction failed: {reason}\nraw response:\n{raw}")]
    Extraction { reason: String, raw: String },

    /// A collaborator call did not complete in time
    #[error("{collaborator} deadline exceeded after {after:?}")]
    DeadlineExceeded {
        collaborator: &'static str,
        after: Duration,
    },
}

impl StageFailure {
    /// Wrap a collaborator error, surfacing deadline expiry as its own kind
    pub fn collaborator<E: CollaboratorError>(collaborator: &'static str, err: E) -> Self {
        match err.deadline() {
            Some(after) => StageFailure::DeadlineExceeded { collaborator, after },
            None => StageFailure::Collaborator {
                collaborator,
                source: Box::new(err),
            },
        }
    }

    pub fn extraction(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        StageFailure::Extraction {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Short machine-friendly label for the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            StageFailure::Validation(_) => "validation",
            StageFailure::Collaborator { .. } => "collaborator",
            StageFailure::Extraction { .. } => "extraction",
            StageFailure::DeadlineExceeded { .. } => "deadline_exceeded",
        }
    }
}
