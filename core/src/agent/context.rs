use crate::traits::Message;

/// Builds the message list handed to the model: one system message in
/// front of the stored history. The system message itself is never stored.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    pub system_prompt: String,
}

impl ContextBuilder {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    pub fn build_system_prompt(&self) -> String {
        self.system_prompt.clone()
    }

    pub fn build_messages(&self, history: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(self.build_system_prompt()));
        messages.extend(history.iter().cloned());
        messages
    }
}
