use std::time::{Duration, Instant};

use crate::agent::claude::{ContentBlock, Message, MessageContent};
use crate::agent::pacing::Pacer;
use crate::agent::tools::{ToolOutput, ToolRegistry};
use crate::agent::DecisionEngine;
use crate::browser::BrowserSession;
use crate::error::{AppError, Result};

const WRAP_UP_MESSAGE: &str = "Stop working now: the session budget is exhausted. \
Reply with the final JSON report covering every listing you processed so far, \
and nothing else.";

/// Outcome of a planner run.
#[derive(Debug)]
pub enum AgentOutcome {
    /// The decision engine finished the task and emitted its narrative.
    Completed { narrative: String },
    /// Turn or wall-clock budget ran out; narrative from the wrap-up exchange.
    BudgetExhausted { narrative: String },
    /// An interstitial could not be cleared within the attempt bound.
    ObstacleUnresolved { description: String },
    /// The decision engine is rate limited.
    RateLimited { message: String },
    /// The abort signal was observed.
    Cancelled,
    /// Unrecoverable failure (session lost, engine error).
    Failed { error: String },
}

/// Budgets and bounds for one planner run.
#[derive(Debug, Clone)]
pub struct AgentLimits {
    pub max_turns: u32,
    pub max_duration: Duration,
    pub max_obstacle_attempts: u32,
}

pub struct AgentEngine {
    engine: Box<dyn DecisionEngine>,
    tools: ToolRegistry,
    limits: AgentLimits,
    pacer: Pacer,
}

impl AgentEngine {
    pub fn new(
        engine: Box<dyn DecisionEngine>,
        tools: ToolRegistry,
        limits: AgentLimits,
        pacer: Pacer,
    ) -> Self {
        Self {
            engine,
            tools,
            limits,
            pacer,
        }
    }

    /// Run the planner loop.
    ///
    /// - `system_prompt`: the task description with the report contract.
    /// - `session`: the live browsing session, exclusively ours for the run.
    /// - `initial_message`: the user message that starts the conversation.
    /// - `is_cancelled`: async callback checked each turn; returns true if
    ///   work should stop.
    pub async fn run<F, Fut>(
        &self,
        system_prompt: &str,
        session: &dyn BrowserSession,
        initial_message: &str,
        is_cancelled: F,
    ) -> AgentOutcome
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        let tool_definitions = self.tools.definitions();

        let mut messages = vec![Message {
            role: "user".to_string(),
            content: MessageContent::Text(initial_message.to_string()),
        }];

        let deadline = Instant::now() + self.limits.max_duration;
        let mut obstacle_attempts = 0u32;
        let mut total_input_tokens = 0u32;
        let mut total_output_tokens = 0u32;

        for turn in 0..self.limits.max_turns {
            // Check for cancellation before each turn
            if is_cancelled().await {
                tracing::info!("Planner cancelled");
                return AgentOutcome::Cancelled;
            }

            if Instant::now() >= deadline {
                tracing::warn!("Wall-clock budget exhausted");
                return self.wrap_up(system_prompt, messages).await;
            }

            tracing::info!(turn = turn, "Planner turn");

            let decision = match self
                .engine
                .decide(system_prompt, &messages, &tool_definitions)
                .await
            {
                Ok(d) => d,
                Err(AppError::ClaudeRateLimited(msg)) => {
                    tracing::warn!("Decision engine rate limited, stopping planner");
                    return AgentOutcome::RateLimited { message: msg };
                }
                Err(e) => {
                    return AgentOutcome::Failed {
                        error: format!("Decision engine error: {e}"),
                    };
                }
            };

            total_input_tokens += decision.usage.input_tokens;
            total_output_tokens += decision.usage.output_tokens;

            tracing::debug!(
                input_tokens = decision.usage.input_tokens,
                output_tokens = decision.usage.output_tokens,
                stop_reason = ?decision.stop_reason,
                "Decision received"
            );

            let stop_reason = decision.stop_reason.as_deref().unwrap_or("unknown");

            match stop_reason {
                "end_turn" => {
                    // Task declared complete -- the text blocks are the narrative
                    let narrative = extract_text(&decision.content);
                    tracing::info!(
                        total_input_tokens,
                        total_output_tokens,
                        turns = turn + 1,
                        "Planner finished"
                    );
                    return AgentOutcome::Completed { narrative };
                }
                "tool_use" => {
                    messages.push(Message {
                        role: "assistant".to_string(),
                        content: MessageContent::Blocks(decision.content.clone()),
                    });

                    let mut tool_results = Vec::new();

                    for block in &decision.content {
                        if let ContentBlock::ToolUse { id, name, input } = block {
                            self.pacer.pause().await;

                            tracing::info!(tool = %name, "Executing action");

                            let result = self.execute_tool(session, name, input).await;

                            match result {
                                Ok(ToolOutput::Success(content)) => {
                                    tracing::debug!(tool = %name, "Action succeeded");
                                    obstacle_attempts = 0;
                                    tool_results.push(ContentBlock::ToolResult {
                                        tool_use_id: id.clone(),
                                        content,
                                        is_error: None,
                                    });
                                }
                                Ok(ToolOutput::Error(error)) => {
                                    tracing::warn!(tool = %name, error = %error, "Action failed");
                                    tool_results.push(ContentBlock::ToolResult {
                                        tool_use_id: id.clone(),
                                        content: error,
                                        is_error: Some(true),
                                    });
                                }
                                Ok(ToolOutput::ObstacleReported { description }) => {
                                    obstacle_attempts += 1;
                                    tracing::warn!(
                                        obstacle = %description,
                                        attempt = obstacle_attempts,
                                        "Obstacle reported"
                                    );
                                    if obstacle_attempts > self.limits.max_obstacle_attempts {
                                        return AgentOutcome::ObstacleUnresolved {
                                            description,
                                        };
                                    }
                                    tool_results.push(ContentBlock::ToolResult {
                                        tool_use_id: id.clone(),
                                        content: "Acknowledged. Perform the remediation, \
                                                  verify the obstacle is gone, then resume \
                                                  the task."
                                            .to_string(),
                                        is_error: None,
                                    });
                                }
                                Err(e) => {
                                    // A fatal session failure means page state can
                                    // no longer be trusted; everything else goes
                                    // back to the engine.
                                    if let AppError::Browser(_) = &e {
                                        tracing::error!(error = %e, "Browsing session unusable");
                                        return AgentOutcome::Failed {
                                            error: e.to_string(),
                                        };
                                    }
                                    tracing::error!(tool = %name, error = %e, "Action execution error");
                                    tool_results.push(ContentBlock::ToolResult {
                                        tool_use_id: id.clone(),
                                        content: format!("Internal error: {e}"),
                                        is_error: Some(true),
                                    });
                                }
                            }
                        }
                    }

                    // Add tool results as a user message
                    messages.push(Message {
                        role: "user".to_string(),
                        content: MessageContent::Blocks(tool_results),
                    });
                }
                "max_tokens" => {
                    // Ran out of tokens in this turn
                    tracing::warn!("Decision hit max_tokens limit");
                    messages.push(Message {
                        role: "assistant".to_string(),
                        content: MessageContent::Blocks(decision.content),
                    });
                    messages.push(Message {
                        role: "user".to_string(),
                        content: MessageContent::Text("Please continue.".to_string()),
                    });
                }
                other => {
                    tracing::warn!(stop_reason = other, "Unexpected stop reason");
                    return AgentOutcome::Failed {
                        error: format!("Unexpected stop reason: {other}"),
                    };
                }
            }
        }

        tracing::warn!(max_turns = self.limits.max_turns, "Planner hit turn limit");
        self.wrap_up(system_prompt, messages).await
    }

    /// One final exchange with tools withheld, so the model must emit the
    /// report for whatever it managed to process.
    async fn wrap_up(&self, system_prompt: &str, mut messages: Vec<Message>) -> AgentOutcome {
        // The conversation may already end on a user turn; fold the wrap-up
        // instruction into it rather than breaking role alternation.
        match messages.last_mut() {
            Some(Message { role, content }) if role == "user" => match content {
                MessageContent::Blocks(blocks) => blocks.push(ContentBlock::Text {
                    text: WRAP_UP_MESSAGE.to_string(),
                }),
                MessageContent::Text(text) => {
                    text.push_str("\n\n");
                    text.push_str(WRAP_UP_MESSAGE);
                }
            },
            _ => messages.push(Message {
                role: "user".to_string(),
                content: MessageContent::Text(WRAP_UP_MESSAGE.to_string()),
            }),
        }

        match self.engine.decide(system_prompt, &messages, &[]).await {
            Ok(decision) => {
                let narrative = extract_text(&decision.content);
                if narrative.trim().is_empty() {
                    AgentOutcome::Failed {
                        error: "Budget exhausted and wrap-up produced no narrative"
                            .to_string(),
                    }
                } else {
                    AgentOutcome::BudgetExhausted { narrative }
                }
            }
            Err(e) => AgentOutcome::Failed {
                error: format!("Wrap-up exchange failed: {e}"),
            },
        }
    }

    async fn execute_tool(
        &self,
        session: &dyn BrowserSession,
        name: &str,
        input: &serde_json::Value,
    ) -> Result<ToolOutput> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| AppError::Agent(format!("Unknown tool: {name}")))?;

        tool.execute(session, input.clone()).await
    }
}

fn extract_text(content: &[ContentBlock]) -> String {
    content
        .iter()
        .filter_map(|block| {
            if let ContentBlock::Text { text } = block {
                Some(text.as_str())
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
