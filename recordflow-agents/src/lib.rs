//! RecordFlow LLM agents
//!
//! Stateless request/response access to text-generation models. A stage
//! builds a [`GenerateRequest`] (instructions, conversation, whether web
//! search is needed) and gets back the model's text. Structured extraction
//! is the same call; the stage parses the text itself.
//!
//! Providers:
//! - [`GeminiAgent`]: Google Generative Language API, with Google Search
//!   grounding for search-enabled requests
//! - [`OpenAiAgent`]: OpenAI-compatible chat completions
//! - [`ScriptedAgent`]: canned responses for tests

pub mod error;
pub mod provider;

pub use error::{AgentError, Result};
pub use provider::gemini::{GeminiAgent, GeminiConfig};
pub use provider::openai::{OpenAiAgent, OpenAiConfig};
pub use provider::scripted::ScriptedAgent;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a message in the conversation sent to a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// A single generation request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerateRequest {
    /// System instructions
    pub instructions: String,
    pub messages: Vec<Message>,
    /// Let the model search the web before answering
    pub web_search: bool,
}

impl GenerateRequest {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            ..Self::default()
        }
    }

    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self
    }
}

/// A text-generation model behind some provider API
#[async_trait]
pub trait Agent: Send + Sync {
    /// Provider name, used in logs and error messages
    fn name(&self) -> &str;

    /// Returns the model's text answer to `request`
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = GenerateRequest::new("Be brief.")
            .user("Describe Acme Capital")
            .with_web_search();

        assert_eq!(request.instructions, "Be brief.");
        assert_eq!(request.messages, vec![Message::user("Describe Acme Capital")]);
        assert!(request.web_search);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_value(Message::assistant("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "ok"}));
    }
}
