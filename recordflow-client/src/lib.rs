//! RecordFlow record store client
//!
//! A small, type-safe client for the tabular record store (Airtable REST
//! API) that holds company, person and pet records.
//!
//! The pipelines only depend on the [`RecordStore`] trait; [`AirtableClient`]
//! is the production implementation and [`InMemoryRecordStore`] backs tests
//! and dry runs.
//!
//! # Example
//!
//! ```no_run
//! use recordflow_client::{AirtableClient, AirtableConfig, RecordStore, tables};
//!
//! # async fn example() -> recordflow_client::Result<()> {
//! let client = AirtableClient::new(AirtableConfig::new("patXXXX", "appXXXX"));
//! client
//!     .update("Companies", "rec123", tables::company_description_fields("..."))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
mod memory;
mod records;
pub mod tables;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use memory::{InMemoryRecordStore, StoreCall};
pub use records::{Fields, RecordStore};

use recordflow_core::retry::RetryPolicy;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

/// Default Airtable REST endpoint
pub const DEFAULT_AIRTABLE_API_URL: &str = "https://api.airtable.com";

/// Connection settings for the Airtable API
#[derive(Debug, Clone)]
pub struct AirtableConfig {
    /// Base URL of the API (e.g., "https://api.airtable.com")
    pub api_url: String,
    /// Personal access token
    pub token: String,
    /// Base identifier (e.g., "appXXXXXXXXXXXXXX")
    pub base_id: String,
    /// Retry and deadline settings applied to every request
    pub retry: RetryPolicy,
}

impl AirtableConfig {
    pub fn new(token: impl Into<String>, base_id: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_AIRTABLE_API_URL.to_string(),
            token: token.into(),
            base_id: base_id.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// HTTP client for the Airtable REST API
#[derive(Debug, Clone)]
pub struct AirtableClient {
    config: AirtableConfig,
    /// HTTP client instance
    client: Client,
}

impl AirtableClient {
    /// Create a new client
    pub fn new(config: AirtableConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc.
    pub fn with_client(mut config: AirtableConfig, client: Client) -> Self {
        config.api_url = config.api_url.trim_end_matches('/').to_string();
        Self { config, client }
    }

    /// Get the base URL of the API
    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }

    /// URL of a table: `{api_url}/v0/{base_id}/{table}` with the table name
    /// percent-encoded
    fn table_url(&self, table: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| ClientError::InvalidRequest(format!("Invalid API URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidRequest("API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("v0")
            .push(&self.config.base_id)
            .push(table);

        Ok(url)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-success status codes become [`ClientError::ApiError`] carrying the
    /// status and the response body.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
