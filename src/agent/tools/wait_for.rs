use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::agent::claude::ToolDefinition;
use crate::agent::tools::{browser_failure, require_param, Tool, ToolOutput};
use crate::browser::BrowserSession;
use crate::error::Result;

const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const MAX_TIMEOUT_MS: u64 = 30_000;

pub struct WaitForTool;

#[async_trait]
impl Tool for WaitForTool {
    fn name(&self) -> &str {
        "wait_for"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "wait_for".to_string(),
            description: "Wait until an element matching a CSS selector appears on the page. Use after actions that load content asynchronously.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "selector": {
                        "type": "string",
                        "description": "CSS selector to wait for"
                    },
                    "timeout_ms": {
                        "type": "integer",
                        "description": "How long to wait, in milliseconds (max 30000)",
                        "default": DEFAULT_TIMEOUT_MS
                    }
                },
                "required": ["selector"]
            }),
            cache_control: None,
        }
    }

    async fn execute(
        &self,
        session: &dyn BrowserSession,
        input: serde_json::Value,
    ) -> Result<ToolOutput> {
        let selector = require_param!(input, "selector");
        let timeout_ms = input
            .get("timeout_ms")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_TIMEOUT_MS)
            .min(MAX_TIMEOUT_MS);

        match session
            .wait_for(selector, Duration::from_millis(timeout_ms))
            .await
        {
            Ok(()) => Ok(ToolOutput::Success(format!("'{selector}' is present"))),
            Err(e) => browser_failure(e),
        }
    }
}
