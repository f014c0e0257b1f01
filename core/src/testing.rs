//! Test doubles shared by the unit tests.

use crate::error::{AgentError, Result, ToolError};
use crate::traits::{
    Message, ModelClient, ModelRequest, ModelResponse, ParamSpec, Tool, ToolArgs, ToolCall,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall::new(id, name, arguments)
}

pub fn tools_requested(calls: Vec<ToolCall>) -> ModelResponse {
    ModelResponse::ToolCallsRequested(calls)
}

/// Replays queued responses and records what it was asked.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<ModelResponse>>>,
    repeat: Option<ModelResponse>,
    delay: Option<Duration>,
    histories: Mutex<Vec<Vec<Message>>>,
    tool_names: Mutex<Vec<Vec<String>>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self::from_results(responses.into_iter().map(Ok).collect())
    }

    pub fn from_results(responses: Vec<Result<ModelResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            repeat: None,
            delay: None,
            histories: Mutex::new(Vec::new()),
            tool_names: Mutex::new(Vec::new()),
        }
    }

    /// Answers every call with `response`.
    pub fn repeating(response: ModelResponse) -> Self {
        let mut model = Self::new(vec![]);
        model.repeat = Some(response);
        model
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn recorded_histories(&self) -> Vec<Vec<Message>> {
        self.histories.lock().unwrap().clone()
    }

    pub fn recorded_tool_names(&self) -> Vec<Vec<String>> {
        self.tool_names.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ModelRequest<'_>) -> Result<ModelResponse> {
        self.histories
            .lock()
            .unwrap()
            .push(request.messages.to_vec());
        self.tool_names
            .lock()
            .unwrap()
            .push(request.tools.iter().map(|t| t.name.clone()).collect());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.responses.lock().unwrap().pop_front();
        match (next, &self.repeat) {
            (Some(response), _) => response,
            (None, Some(response)) => Ok(response.clone()),
            (None, None) => Err(AgentError::ModelUnavailable("script exhausted".into())),
        }
    }
}

/// Parameterless tool that sleeps before returning a fixed value.
pub struct DelayedTool {
    name: String,
    delay: Duration,
    value: Value,
    log: Option<Arc<Mutex<Vec<String>>>>,
}

impl DelayedTool {
    pub fn new(name: &str, delay_ms: u64, value: Value) -> Self {
        Self {
            name: name.to_string(),
            delay: Duration::from_millis(delay_ms),
            value,
            log: None,
        }
    }

    /// Records the tool name in `log` when the call finishes.
    pub fn with_log(mut self, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.log = Some(log);
        self
    }
}

#[async_trait]
impl Tool for DelayedTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "test tool"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![]
    }

    async fn call(&self, _args: &ToolArgs) -> std::result::Result<Value, ToolError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(log) = &self.log {
            log.lock().unwrap().push(self.name.clone());
        }
        Ok(self.value.clone())
    }
}
