pub mod provider;
pub mod store;
pub mod tool;

pub use provider::{
    Content, ContentPart, Message, ModelClient, ModelRequest, ModelResponse, Role, ToolCall,
};
pub use store::{ThreadStore, ThreadSummary};
pub use tool::{ParamKind, ParamSpec, Tool, ToolArgs, ToolCallResult, ToolSpec};
