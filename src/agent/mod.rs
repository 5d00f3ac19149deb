pub mod claude;
pub mod engine;
pub mod pacing;
pub mod prompt;
pub mod tools;

use async_trait::async_trait;

use crate::error::Result;
use claude::{ContentBlock, Message, ToolDefinition, Usage};

/// One decision: the model's content blocks plus the reason it stopped.
#[derive(Debug, Clone)]
pub struct Decision {
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

/// The component that, given the conversation so far, chooses the next
/// action or produces the terminal narrative. Consumed as a black box; the
/// planner depends only on this exchange, never on the engine's internals.
#[async_trait]
pub trait DecisionEngine: Send + Sync {
    async fn decide(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Decision>;
}
