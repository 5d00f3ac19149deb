use async_trait::async_trait;
use serde_json::json;

use crate::agent::claude::ToolDefinition;
use crate::agent::tools::{browser_failure, require_param, Tool, ToolOutput};
use crate::browser::BrowserSession;
use crate::error::Result;

pub struct TypeTextTool;

#[async_trait]
impl Tool for TypeTextTool {
    fn name(&self) -> &str {
        "type_text"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "type_text".to_string(),
            description: "Focus the element matching a CSS selector and type text into it. Set submit to also press Enter afterwards (e.g. for search boxes).".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "selector": {
                        "type": "string",
                        "description": "CSS selector of the input element"
                    },
                    "text": {
                        "type": "string",
                        "description": "Text to type"
                    },
                    "submit": {
                        "type": "boolean",
                        "description": "Press Enter after typing",
                        "default": false
                    }
                },
                "required": ["selector", "text"]
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
        let text = require_param!(input, "text");
        let submit = input
            .get("submit")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        if let Err(e) = session.type_text(selector, text).await {
            return browser_failure(e);
        }

        if submit {
            if let Err(e) = session.press_key("Enter").await {
                return browser_failure(e);
            }
            return Ok(ToolOutput::Success(format!(
                "Typed into '{selector}' and submitted"
            )));
        }

        Ok(ToolOutput::Success(format!("Typed into '{selector}'")))
    }
}
