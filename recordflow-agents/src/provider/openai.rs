//! OpenAI-compatible chat completions provider

use async_trait::async_trait;
use recordflow_core::retry::{RetryPolicy, with_retry};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::handle_response;
use crate::error::{AgentError, Result};
use crate::{Agent, GenerateRequest, MessageRole};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub retry: RetryPolicy,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
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

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat completions client
#[derive(Debug, Clone)]
pub struct OpenAiAgent {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiAgent {
    pub fn new(config: OpenAiConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(mut config: OpenAiConfig, client: Client) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self { config, client }
    }
}

#[async_trait]
impl Agent for OpenAiAgent {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        if request.web_search {
            return Err(AgentError::Unsupported(
                "chat completions cannot search the web; use a search-capable provider"
                    .to_string(),
            ));
        }

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.instructions.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: &request.instructions,
            });
        }
        messages.extend(request.messages.iter().map(|m| ChatMessage {
            role: match m.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            },
            content: &m.content,
        }));

        let body = ChatRequest {
            model: &self.config.model,
            messages,
        };
        let url = format!("{}/chat/completions", self.config.base_url);

        debug!(
            "OpenAI request: model={}, messages={}",
            self.config.model,
            body.messages.len()
        );

        let operation = format!("openai {} chat completion", self.config.model);
        let response: ChatResponse = with_retry(&self.config.retry, &operation, || async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.config.api_key)
                .json(&body)
                .send()
                .await?;
            handle_response(response).await
        })
        .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(AgentError::EmptyResponse)
    }
}
