use async_trait::async_trait;
use serde_json::json;

use crate::agent::claude::ToolDefinition;
use crate::agent::tools::{require_param, Tool, ToolOutput};
use crate::browser::BrowserSession;
use crate::error::Result;

/// Recognition signal for unexpected interstitials. The remediation itself
/// is carried out with the ordinary action tools; reporting first lets the
/// planner bound how long the run stays stuck on obstacles.
pub struct ResolveObstacleTool;

#[async_trait]
impl Tool for ResolveObstacleTool {
    fn name(&self) -> &str {
        "resolve_obstacle"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "resolve_obstacle".to_string(),
            description: "Report an unexpected page state that blocks the task (human-verification challenge, confirmation dialog, popup) together with the remediation you are about to perform. Call this before acting on the obstacle.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "What is blocking the task"
                    },
                    "remediation": {
                        "type": "string",
                        "description": "The action you will take to clear it"
                    }
                },
                "required": ["description", "remediation"]
            }),
            cache_control: None,
        }
    }

    async fn execute(
        &self,
        _session: &dyn BrowserSession,
        input: serde_json::Value,
    ) -> Result<ToolOutput> {
        let description = require_param!(input, "description");
        let remediation = require_param!(input, "remediation");

        tracing::info!(
            obstacle = %description,
            remediation = %remediation,
            "Obstacle reported"
        );

        Ok(ToolOutput::ObstacleReported {
            description: description.to_string(),
        })
    }
}
