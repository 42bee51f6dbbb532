//! Error types for LLM agents

use std::time::Duration;

use recordflow_core::retry::CollaboratorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Provider returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Provider answered without any text
    #[error("Provider returned no text")]
    EmptyResponse,

    /// Request asks for something this provider cannot do
    #[error("Unsupported request: {0}")]
    Unsupported(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl AgentError {
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }
}

impl CollaboratorError for AgentError {
    fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::ApiError { status, .. } => *status == 429 || *status >= 500,
            Self::Timeout(_) => true,
            Self::ParseError(_) | Self::EmptyResponse | Self::Unsupported(_) => false,
        }
    }

    fn deadline_exceeded(after: Duration) -> Self {
        Self::Timeout(after)
    }

    fn deadline(&self) -> Option<Duration> {
        match self {
            Self::Timeout(after) => Some(*after),
            _ => None,
        }
    }
}
