//! Agentic tool-selection layer.
//!
//! Given a user message and its chat context, the orchestrator decides
//! whether to answer directly or to run one or more specialized tools,
//! runs always-on background tools, and reconciles the results.

mod context;
mod modes;
mod orchestrator;
mod reconciler;
mod selector;
mod tool;

pub use context::{ChatContext, FILES_RAG_INSTANCE};
pub use modes::{resolve_forced_mode, ActiveModes, Mode};
pub use orchestrator::{AgentConfig, AgentOrchestrator, ToolInfo};
pub use reconciler::{decide, DirectAnswer, FinalResponse, Reconciler, FALLBACK_APOLOGY};
pub use selector::{ConfidenceSelector, ScoredTool, SelectionOutcome};
pub use tool::{preview, MessageType, Tool, ToolResult, ToolRole};
