//! Deterministic agent replaying canned responses

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::{Agent, GenerateRequest};

enum Scripted {
    Reply(String),
    Fail { status: u16, message: String },
}

#[derive(Default)]
struct State {
    script: VecDeque<Scripted>,
    fallback: Option<String>,
    requests: Vec<GenerateRequest>,
}

/// Agent that answers from a script instead of a model
///
/// Scripted answers are consumed in order. Once the script runs out the
/// fallback answer (if any) is returned for every further request,
/// otherwise the call fails with [`AgentError::EmptyResponse`].
pub struct ScriptedAgent {
    name: String,
    state: Mutex<State>,
}

impl ScriptedAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Queues a successful answer
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Scripted::Reply(text.into()));
        self
    }

    /// Queues a provider error
    pub fn fail_with(self, status: u16, message: impl Into<String>) -> Self {
        self.push(Scripted::Fail {
            status,
            message: message.into(),
        });
        self
    }

    /// Answer returned once the script is exhausted
    pub fn always(self, text: impl Into<String>) -> Self {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).fallback = Some(text.into());
        self
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).requests.clone()
    }

    fn push(&self, entry: Scripted) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).script.push_back(entry);
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.requests.push(request.clone());

        match state.script.pop_front() {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail { status, message }) => Err(AgentError::api_error(status, message)),
            None => state.fallback.clone().ok_or(AgentError::EmptyResponse),
        }
    }
}
