use async_trait::async_trait;
use serde_json::json;

use crate::agent::claude::ToolDefinition;
use crate::agent::tools::{browser_failure, require_param, Tool, ToolOutput};
use crate::browser::BrowserSession;
use crate::error::Result;

pub struct ClickTool;

#[async_trait]
impl Tool for ClickTool {
    fn name(&self) -> &str {
        "click"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "click".to_string(),
            description: "Click the first element matching a CSS selector. Use extract_text afterwards to observe what changed.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "selector": {
                        "type": "string",
                        "description": "CSS selector of the element to click"
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

        match session.click(selector).await {
            Ok(page) => Ok(ToolOutput::Success(format!(
                "Clicked '{selector}'; now on {} ({})",
                page.url, page.title
            ))),
            Err(e) => browser_failure(e),
        }
    }
}
