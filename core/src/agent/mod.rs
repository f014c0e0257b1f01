pub mod context;
pub mod executor;
pub mod loop_;
pub mod profile;
pub mod registry;
pub mod session;
pub mod state;

pub use context::ContextBuilder;
pub use executor::ToolExecutor;
pub use loop_::AgentLoop;
pub use profile::AgentProfile;
pub use registry::ToolRegistry;
pub use session::{Session, TurnOutcome};
pub use state::ConversationState;
