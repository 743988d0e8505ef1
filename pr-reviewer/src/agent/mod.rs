//! Bounded tool-calling agent.
//!
//! The model either asks for a local tool or gives a final answer. Replies
//! are decoded once at the model boundary into [`ModelReply`]; the loop only
//! ever branches on that enum.

pub mod agent_loop;
pub mod gemini;
pub mod prompt;
pub mod transcript;

pub use agent_loop::{AgentError, AgentLoop, AgentRun, FinalAnswer, LoopState};
pub use gemini::GeminiModel;
pub use transcript::{Role, ToolInvocationRequest, ToolResult, Transcript, Turn, TurnContent};

use crate::tools::ToolDescriptor;

/// Decoded model response.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    ToolCall(ToolInvocationRequest),
    FinalAnswer(String),
}

/// Model collaborator.
///
/// Used with concrete types only (generic parameters), so plain `async fn`
/// is enough here.
#[allow(async_fn_in_trait)]
pub trait ModelClient {
    /// One agent step: full transcript and tool list in, decoded reply out.
    async fn respond(
        &self,
        transcript: &[Turn],
        tools: &[ToolDescriptor],
    ) -> ai_llm_service::Result<ModelReply>;

    /// Single-shot completion without tools. `json_output` constrains the
    /// answer to JSON.
    async fn complete(&self, prompt: &str, json_output: bool) -> ai_llm_service::Result<String>;
}
