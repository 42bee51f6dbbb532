//! Google Generative Language (Gemini) provider
//!
//! Search-enabled requests attach the `google_search` tool so the model
//! grounds its answer in live search results.

use async_trait::async_trait;
use recordflow_core::retry::{RetryPolicy, with_retry};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::handle_response;
use crate::error::{AgentError, Result};
use crate::{Agent, GenerateRequest, MessageRole};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub retry: RetryPolicy,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

// Wire types

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn into_text(self) -> Result<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AgentError::EmptyResponse);
        }
        Ok(text)
    }
}

fn build_body(request: &GenerateRequest) -> GenerateContentRequest<'_> {
    let system_instruction = (!request.instructions.is_empty()).then(|| Content {
        role: None,
        parts: vec![Part {
            text: &request.instructions,
        }],
    });

    let contents = request
        .messages
        .iter()
        .map(|m| Content {
            role: Some(match m.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "model",
            }),
            parts: vec![Part { text: &m.content }],
        })
        .collect();

    let tools = if request.web_search {
        vec![Tool {
            google_search: GoogleSearch {},
        }]
    } else {
        Vec::new()
    };

    GenerateContentRequest {
        system_instruction,
        contents,
        tools,
    }
}

/// Gemini `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiAgent {
    config: GeminiConfig,
    client: Client,
}

impl GeminiAgent {
    pub fn new(config: GeminiConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(mut config: GeminiConfig, client: Client) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self { config, client }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl Agent for GeminiAgent {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let url = self.endpoint();
        let body = build_body(request);

        debug!(
            "Gemini request: model={}, messages={}, web_search={}",
            self.config.model,
            request.messages.len(),
            request.web_search
        );

        let operation = format!("gemini {} generateContent", self.config.model);
        let response: GenerateContentResponse =
            with_retry(&self.config.retry, &operation, || async {
                let response = self
                    .client
                    .post(&url)
                    .header("x-goog-api-key", &self.config.api_key)
                    .json(&body)
                    .send()
                    .await?;
                handle_response(response).await
            })
            .await?;

        response.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn agent_for(server: &MockServer) -> GeminiAgent {
        let retry = RetryPolicy::new(2, Duration::from_secs(5))
            .with_delays(Duration::from_millis(1), Duration::from_millis(2));
        GeminiAgent::new(
            GeminiConfig::new("gm-key")
                .with_base_url(server.uri())
                .with_retry(retry),
        )
    }

    fn text_response(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn test_search_request_attaches_google_search_tool() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "gm-key"))
            .and(body_json(json!({
                "systemInstruction": {"parts": [{"text": "Search first."}]},
                "contents": [{"role": "user", "parts": [{"text": "Acme Capital"}]}],
                "tools": [{"google_search": {}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Acme draft")))
            .expect(1)
            .mount(&server)
            .await;

        let request = GenerateRequest::new("Search first.")
            .user("Acme Capital")
            .with_web_search();
        let text = agent_for(&server).generate(&request).await.unwrap();

        assert_eq!(text, "Acme draft");
    }

    #[tokio::test]
    async fn test_plain_request_has_no_tools() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "hel"}, {"text": "lo"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = agent_for(&server)
            .generate(&GenerateRequest::new("").user("hello"))
            .await
            .unwrap();

        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let err = agent_for(&server)
            .generate(&GenerateRequest::new("x").user("y"))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_bad_key_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .expect(1)
            .mount(&server)
            .await;

        let err = agent_for(&server)
            .generate(&GenerateRequest::new("x").user("y"))
            .await
            .unwrap_err();

        match err {
            AgentError::ApiError { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("API key not valid"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
