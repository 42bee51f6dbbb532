//! Agent providers

pub mod gemini;
pub mod openai;
pub mod scripted;

use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::error::{AgentError, Result};

/// Map non-success statuses to [`AgentError::ApiError`] and decode the body
async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AgentError::api_error(status.as_u16(), error_text));
    }

    response
        .json()
        .await
        .map_err(|e| AgentError::ParseError(format!("Failed to parse JSON response: {}", e)))
}
