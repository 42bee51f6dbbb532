//! Pipeline configuration
//!
//! Credentials, endpoints, table names and call limits for the
//! collaborators the pipelines talk to. Only binaries read the environment;
//! everything below them receives an explicit config.

use std::str::FromStr;
use std::time::Duration;

use recordflow_agents::provider::gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use recordflow_agents::provider::openai::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use recordflow_agents::{GeminiConfig, OpenAiConfig};
use recordflow_client::tables::TableNames;
use recordflow_client::{AirtableConfig, DEFAULT_AIRTABLE_API_URL};
use recordflow_core::retry::RetryPolicy;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Airtable personal access token
    pub airtable_token: String,
    pub airtable_base_id: String,
    pub airtable_api_url: String,
    pub tables: TableNames,

    /// Key for the polishing and extraction agents
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,

    /// Key for the search-enabled research agent
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,

    /// Attempts per collaborator call, including the first
    pub max_retries: u32,

    /// Deadline for a single agent call
    pub agent_timeout: Duration,

    /// Deadline for a single record store call
    pub store_timeout: Duration,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(
        airtable_token: String,
        airtable_base_id: String,
        openai_api_key: String,
        gemini_api_key: String,
    ) -> Self {
        Self {
            airtable_token,
            airtable_base_id,
            airtable_api_url: DEFAULT_AIRTABLE_API_URL.to_string(),
            tables: TableNames::default(),
            openai_api_key,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            gemini_api_key,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            max_retries: 3,
            agent_timeout: Duration::from_secs(60),
            store_timeout: Duration::from_secs(30),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - OPENAI_API_KEY (required)
    /// - GEMINI_API_KEY (required)
    /// - AIRTABLE_TOKEN, AIRTABLE_BASE_ID (required unless the record store
    ///   is replaced, see [`Config::validate_agents`])
    /// - AIRTABLE_API_URL, OPENAI_BASE_URL, GEMINI_BASE_URL (optional)
    /// - AIRTABLE_COMPANIES_TABLE, AIRTABLE_PEOPLE_TABLE, AIRTABLE_PETS_TABLE
    ///   (optional, default: Companies, People, Pets)
    /// - OPENAI_MODEL (optional, default: gpt-4o-mini)
    /// - GEMINI_MODEL (optional, default: gemini-2.0-flash)
    /// - RECORDFLOW_MAX_RETRIES (optional, default: 3)
    /// - RECORDFLOW_CALL_TIMEOUT_SECS (optional, overrides both the agent
    ///   (60s) and store (30s) deadlines)
    pub fn from_env() -> anyhow::Result<Self> {
        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY environment variable not set"))?;

        let airtable_token = std::env::var("AIRTABLE_TOKEN").unwrap_or_default();
        let airtable_base_id = std::env::var("AIRTABLE_BASE_ID").unwrap_or_default();

        let mut config = Self::new(
            airtable_token,
            airtable_base_id,
            openai_api_key,
            gemini_api_key,
        );

        if let Some(url) = env_opt("AIRTABLE_API_URL") {
            config.airtable_api_url = url;
        }
        if let Some(table) = env_opt("AIRTABLE_COMPANIES_TABLE") {
            config.tables.companies = table;
        }
        if let Some(table) = env_opt("AIRTABLE_PEOPLE_TABLE") {
            config.tables.people = table;
        }
        if let Some(table) = env_opt("AIRTABLE_PETS_TABLE") {
            config.tables.pets = table;
        }
        if let Some(model) = env_opt("OPENAI_MODEL") {
            config.openai_model = model;
        }
        if let Some(url) = env_opt("OPENAI_BASE_URL") {
            config.openai_base_url = url;
        }
        if let Some(model) = env_opt("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Some(url) = env_opt("GEMINI_BASE_URL") {
            config.gemini_base_url = url;
        }

        if let Some(retries) = parse_opt("RECORDFLOW_MAX_RETRIES", env_opt("RECORDFLOW_MAX_RETRIES"))? {
            config.max_retries = retries;
        }

        if let Some(timeout) = parse_opt::<u64>(
            "RECORDFLOW_CALL_TIMEOUT_SECS",
            env_opt("RECORDFLOW_CALL_TIMEOUT_SECS"),
        )?
        .map(Duration::from_secs)
        {
            config.agent_timeout = timeout;
            config.store_timeout = timeout;
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_agents()?;

        if self.airtable_token.is_empty() {
            anyhow::bail!("airtable_token cannot be empty");
        }

        if self.airtable_base_id.is_empty() {
            anyhow::bail!("airtable_base_id cannot be empty");
        }

        require_http("airtable_api_url", &self.airtable_api_url)?;

        for (name, table) in [
            ("companies", &self.tables.companies),
            ("people", &self.tables.people),
            ("pets", &self.tables.pets),
        ] {
            if table.trim().is_empty() {
                anyhow::bail!("{} table name cannot be empty", name);
            }
        }

        Ok(())
    }

    /// Validates only the agent settings, for runs that do not touch Airtable
    pub fn validate_agents(&self) -> anyhow::Result<()> {
        if self.openai_api_key.is_empty() {
            anyhow::bail!("openai_api_key cannot be empty");
        }

        if self.gemini_api_key.is_empty() {
            anyhow::bail!("gemini_api_key cannot be empty");
        }

        require_http("openai_base_url", &self.openai_base_url)?;
        require_http("gemini_base_url", &self.gemini_base_url)?;

        if self.max_retries == 0 {
            anyhow::bail!("max_retries must be greater than 0");
        }

        if self.agent_timeout.is_zero() || self.store_timeout.is_zero() {
            anyhow::bail!("call timeouts must be greater than 0");
        }

        Ok(())
    }

    pub fn agent_retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.agent_timeout)
    }

    pub fn store_retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.store_timeout)
    }

    pub fn airtable_config(&self) -> AirtableConfig {
        AirtableConfig::new(&self.airtable_token, &self.airtable_base_id)
            .with_api_url(&self.airtable_api_url)
            .with_retry(self.store_retry())
    }

    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig::new(&self.openai_api_key)
            .with_model(&self.openai_model)
            .with_base_url(&self.openai_base_url)
            .with_retry(self.agent_retry())
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig::new(&self.gemini_api_key)
            .with_model(&self.gemini_model)
            .with_base_url(&self.gemini_base_url)
            .with_retry(self.agent_retry())
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parses an optional setting; a present but malformed value is an error
fn parse_opt<T: FromStr>(name: &str, value: Option<String>) -> anyhow::Result<Option<T>> {
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer, got '{}'", name, v))
        })
        .transpose()
}

fn require_http(name: &str, url: &str) -> anyhow::Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(
            "patTEST".to_string(),
            "appBase".to_string(),
            "sk-test".to_string(),
            "gm-test".to_string(),
        )
    }

    #[test]
    fn test_default_config() {
        let config = config();
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.tables, TableNames::default());
        assert_eq!(config.agent_timeout, Duration::from_secs(60));
        assert_eq!(config.store_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = config();

        config.airtable_token = String::new();
        assert!(config.validate().is_err());
        // Agents alone are still usable
        assert!(config.validate_agents().is_ok());

        config.airtable_token = "patTEST".to_string();
        config.openai_base_url = "api.openai.com".to_string();
        assert!(config.validate().is_err());

        config.openai_base_url = "https://api.openai.com/v1".to_string();
        config.tables.pets = " ".to_string();
        assert!(config.validate().is_err());

        config.tables.pets = "Pets".to_string();
        config.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_numeric_settings_reject_garbage() {
        assert_eq!(parse_opt::<u32>("RECORDFLOW_MAX_RETRIES", None).unwrap(), None);
        assert_eq!(
            parse_opt::<u64>("RECORDFLOW_CALL_TIMEOUT_SECS", Some(" 15 ".to_string())).unwrap(),
            Some(15)
        );

        let err = parse_opt::<u32>("RECORDFLOW_MAX_RETRIES", Some("abc".to_string())).unwrap_err();
        assert!(err.to_string().contains("RECORDFLOW_MAX_RETRIES"));
        assert!(err.to_string().contains("abc"));
        assert!(parse_opt::<u64>("RECORDFLOW_CALL_TIMEOUT_SECS", Some("-5".to_string())).is_err());
    }

    #[test]
    fn test_collaborator_configs_carry_limits() {
        let mut config = config();
        config.max_retries = 5;
        config.airtable_api_url = "http://localhost:9000".to_string();

        let airtable = config.airtable_config();
        assert_eq!(airtable.api_url, "http://localhost:9000");
        assert_eq!(airtable.retry.max_attempts, 5);
        assert_eq!(airtable.retry.call_timeout, Duration::from_secs(30));

        let gemini = config.gemini_config();
        assert_eq!(gemini.retry.call_timeout, Duration::from_secs(60));
        assert_eq!(gemini.model, "gemini-2.0-flash");
    }
}
