pub mod agent;
pub mod config;
pub mod error;
pub mod memory;
pub mod providers;
pub mod tools;
pub mod traits;

#[cfg(test)]
mod testing;

pub use agent::{
    AgentLoop, AgentProfile, ContextBuilder, ConversationState, Session, ToolExecutor,
    ToolRegistry, TurnOutcome,
};
pub use config::*;
pub use error::{AgentError, Result, ToolError};
pub use memory::{InMemoryThreadStore, JsonFileThreadStore, create_store};
pub use providers::{OpenAIClient, create_client};
pub use tools::*;
pub use traits::*;
