use crate::agent::{ContextBuilder, ConversationState, ToolExecutor, ToolRegistry};
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::traits::{Message, ModelClient, ModelRequest, ModelResponse, ToolCall, ToolSpec};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const DEFAULT_MAX_ROUND_TRIPS: usize = 10;
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 120;

/// Where the loop is within a turn.
#[derive(Debug)]
enum Step {
    AwaitingModel,
    ExecutingTools(Vec<ToolCall>),
    Done(Message),
}

/// Drives one turn: ask the model, run the tools it requests, feed the
/// results back, and stop at the first final answer.
pub struct AgentLoop {
    client: Arc<dyn ModelClient>,
    context_builder: ContextBuilder,
    tool_registry: Arc<ToolRegistry>,
    executor: ToolExecutor,
    max_round_trips: usize,
    model_timeout: Duration,
    allow_empty_tool_calls: bool,
}

impl AgentLoop {
    pub fn new(
        client: Arc<dyn ModelClient>,
        context_builder: ContextBuilder,
        tool_registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            client,
            context_builder,
            tool_registry,
            executor: ToolExecutor::new(),
            max_round_trips: DEFAULT_MAX_ROUND_TRIPS,
            model_timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS),
            allow_empty_tool_calls: false,
        }
    }

    pub fn with_max_round_trips(mut self, max: usize) -> Self {
        self.max_round_trips = max;
        self
    }

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_parallel_tools(mut self, parallel: bool) -> Self {
        self.executor = self.executor.with_parallel(parallel);
        self
    }

    pub fn with_allow_empty_tool_calls(mut self, allow: bool) -> Self {
        self.allow_empty_tool_calls = allow;
        self
    }

    pub fn with_config(self, config: &AgentConfig) -> Self {
        self.with_max_round_trips(config.max_round_trips)
            .with_model_timeout(Duration::from_secs(config.model_timeout_secs))
            .with_parallel_tools(config.parallel_tools)
            .with_allow_empty_tool_calls(config.allow_empty_tool_calls)
    }

    /// One-shot turn on a fresh history; returns the answer text.
    pub async fn process(&self, message: &str) -> Result<String> {
        let mut state = ConversationState::new_thread();
        let answer = self
            .run_turn(&mut state, Message::human(message), &CancellationToken::new())
            .await?;
        Ok(answer.text())
    }

    /// Appends `input` to `state` and runs until the model gives a final
    /// answer, which is appended and returned.
    ///
    /// On error `state` keeps whatever was committed before the failure; it
    /// never ends on tool calls without results.
    pub async fn run_turn(
        &self,
        state: &mut ConversationState,
        input: Message,
        cancel: &CancellationToken,
    ) -> Result<Message> {
        state.begin_turn();
        state.push(input);

        let specs = self.tool_registry.specs();
        let mut step = Step::AwaitingModel;

        loop {
            if cancel.is_cancelled() {
                warn!(thread_id = state.thread_id(), "turn cancelled");
                return Err(AgentError::Cancelled);
            }

            step = match step {
                Step::AwaitingModel => {
                    debug!(
                        thread_id = state.thread_id(),
                        round_trips = state.round_trips(),
                        messages = state.len(),
                        "calling model"
                    );
                    let response = self.complete(state, &specs, cancel).await?;
                    self.next_step(state, response)?
                }
                Step::ExecutingTools(calls) => {
                    let results = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            warn!(thread_id = state.thread_id(), "turn cancelled during tool execution");
                            return Err(AgentError::Cancelled);
                        }
                        results = self.executor.execute_all(&calls, &self.tool_registry) => results,
                    };
                    state.commit_tool_round(Message::ai_with_tool_calls("", calls), results);
                    Step::AwaitingModel
                }
                Step::Done(answer) => {
                    state.push(answer.clone());
                    info!(
                        thread_id = state.thread_id(),
                        round_trips = state.round_trips(),
                        "turn complete"
                    );
                    return Ok(answer);
                }
            };
        }
    }

    fn next_step(&self, state: &ConversationState, response: ModelResponse) -> Result<Step> {
        match response {
            ModelResponse::FinalAnswer(text) => Ok(Step::Done(Message::ai(text))),
            ModelResponse::ToolCallsRequested(calls) if calls.is_empty() => {
                if self.allow_empty_tool_calls {
                    Ok(Step::Done(Message::ai("")))
                } else {
                    Err(AgentError::MalformedResponse(
                        "model requested an empty list of tool calls".into(),
                    ))
                }
            }
            ModelResponse::ToolCallsRequested(calls) => {
                check_unique_call_ids(&calls)?;
                if state.round_trips() >= self.max_round_trips {
                    warn!(
                        thread_id = state.thread_id(),
                        budget = self.max_round_trips,
                        "turn budget exhausted"
                    );
                    return Err(AgentError::TurnBudgetExceeded(self.max_round_trips));
                }
                debug!(
                    thread_id = state.thread_id(),
                    tools = ?calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                    "model requested tools"
                );
                Ok(Step::ExecutingTools(calls))
            }
        }
    }

    async fn complete(
        &self,
        state: &ConversationState,
        specs: &[ToolSpec],
        cancel: &CancellationToken,
    ) -> Result<ModelResponse> {
        let messages = self.context_builder.build_messages(state.messages());
        let request = ModelRequest {
            messages: &messages,
            tools: specs,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AgentError::Cancelled),
            response = tokio::time::timeout(self.model_timeout, self.client.complete(request)) => {
                match response {
                    Ok(response) => response,
                    Err(_) => Err(AgentError::ModelTimeout(self.model_timeout.as_secs())),
                }
            }
        }
    }
}

fn check_unique_call_ids(calls: &[ToolCall]) -> Result<()> {
    let mut seen = HashSet::with_capacity(calls.len());
    for call in calls {
        if !seen.insert(call.id.as_str()) {
            return Err(AgentError::MalformedResponse(format!(
                "duplicate tool call id: {}",
                call.id
            )));
        }
    }
    Ok(())
}
