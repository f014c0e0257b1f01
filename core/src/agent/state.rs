use crate::traits::{Message, Role, ToolCallResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// History of one conversation thread.
///
/// Messages are only ever appended. A tool round (the AI message carrying
/// tool calls plus one result per call) is committed in a single step, so
/// the history never ends on tool calls that have no results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationState {
    thread_id: String,
    messages: Vec<Message>,
    #[serde(default)]
    round_trips: usize,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationState {
    pub fn new(thread_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            thread_id: thread_id.into(),
            messages: Vec::new(),
            round_trips: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// A fresh thread with a random id.
    pub fn new_thread() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Tool round trips taken so far in the current turn.
    pub fn round_trips(&self) -> usize {
        self.round_trips
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    pub(crate) fn begin_turn(&mut self) {
        self.round_trips = 0;
    }

    pub(crate) fn commit_tool_round(&mut self, ai: Message, results: Vec<ToolCallResult>) {
        debug_assert_eq!(ai.tool_calls().len(), results.len());
        debug_assert!(
            ai.tool_calls()
                .iter()
                .zip(&results)
                .all(|(call, result)| call.id == result.call_id)
        );

        self.messages.push(ai);
        self.messages
            .extend(results.iter().map(ToolCallResult::to_message));
        self.round_trips += 1;
        self.updated_at = Utc::now();
    }

    /// Every AI tool call is answered by exactly one tool message, and those
    /// answers follow the call directly, in order.
    pub fn is_consistent(&self) -> bool {
        let mut i = 0;
        while i < self.messages.len() {
            let message = &self.messages[i];
            i += 1;
            if message.role() != Role::Ai || !message.has_tool_calls() {
                continue;
            }
            for call in message.tool_calls() {
                match self.messages.get(i) {
                    Some(m) if m.role() == Role::Tool && m.tool_call_id() == Some(&call.id) => {
                        i += 1
                    }
                    _ => return false,
                }
            }
        }
        true
    }
}
