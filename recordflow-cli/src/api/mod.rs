//! API client module
//!
//! HTTP client for the RecordFlow orchestrator API.

use anyhow::{Context, Result};
use recordflow_core::domain::run::PipelineRun;
use recordflow_core::dto::run::{ErrorBody, QueuedRun};
use reqwest::Client;
use serde_json::json;

/// HTTP client for the orchestrator API
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Queue the company description pipeline
    pub async fn trigger_company(&self, record_id: &str, name: &str) -> Result<QueuedRun> {
        let url = format!("{}/airtable/company-created", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "airtableRecordId": record_id, "name": name }))
            .send()
            .await
            .context("Failed to send company trigger")?;

        self.handle_response(response).await
    }

    /// Queue the people and pets import pipeline
    pub async fn trigger_people(&self, description: &str) -> Result<QueuedRun> {
        let url = format!("{}/people/import", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "description": description }))
            .send()
            .await
            .context("Failed to send people import trigger")?;

        self.handle_response(response).await
    }

    /// Get the latest snapshot of a run
    pub async fn get_run(&self, run_id: &str) -> Result<PipelineRun> {
        let url = format!("{}/runs/{}", self.base_url, run_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send run status request")?;

        self.handle_response(response).await
    }

    /// Handle API response and deserialize JSON
    ///
    /// Error responses carry `{"error": message}`; the message is surfaced
    /// when present, the raw body otherwise.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&error_text)
                .map(|body| body.error)
                .unwrap_or(error_text);
            anyhow::bail!("Request failed with status {}: {}", status, message);
        }

        response
            .json()
            .await
            .context("Failed to parse response JSON")
    }
}
