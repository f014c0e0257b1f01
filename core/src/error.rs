use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

/// Failures that belong to a single tool call. These never abort a turn:
/// the executor turns them into a tool message the model can react to.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {reason}")]
    ArgumentValidation { tool: String, reason: String },

    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    pub fn invalid(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ArgumentValidation {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

/// Failures that end the turn and are handed back to the caller.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("model did not respond within {0} seconds")]
    ModelTimeout(u64),

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("turn exceeded its budget of {0} tool round trips")]
    TurnBudgetExceeded(usize),

    #[error("tool already registered: {0}")]
    DuplicateTool(String),

    #[error("turn cancelled")]
    Cancelled,

    #[error("thread store error: {0}")]
    Store(String),
}

impl AgentError {
    /// Whether retrying the whole turn could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ModelUnavailable(_) | Self::ModelTimeout(_))
    }
}
