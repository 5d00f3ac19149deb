use async_trait::async_trait;
use serde_json::json;

use crate::agent::claude::ToolDefinition;
use crate::agent::tools::{browser_failure, Tool, ToolOutput};
use crate::browser::BrowserSession;
use crate::error::Result;

pub struct ExtractTextTool {
    max_chars: usize,
}

impl ExtractTextTool {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

#[async_trait]
impl Tool for ExtractTextTool {
    fn name(&self) -> &str {
        "extract_text"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "extract_text".to_string(),
            description: "Read the visible text of the page, or of the first element matching a CSS selector. This is how you observe the page; extract before deciding what to do next.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "selector": {
                        "type": "string",
                        "description": "Optional CSS selector; omit to read the whole page"
                    }
                }
            }),
            cache_control: None,
        }
    }

    async fn execute(
        &self,
        session: &dyn BrowserSession,
        input: serde_json::Value,
    ) -> Result<ToolOutput> {
        let selector = input.get("selector").and_then(|v| v.as_str());

        match session.extract_text(selector).await {
            Ok(text) => {
                if text.trim().is_empty() {
                    return Ok(ToolOutput::Success("(no visible text)".to_string()));
                }
                if text.chars().count() > self.max_chars {
                    let truncated: String = text.chars().take(self.max_chars).collect();
                    return Ok(ToolOutput::Success(format!(
                        "{truncated}\n[... text truncated ...]"
                    )));
                }
                Ok(ToolOutput::Success(text))
            }
            Err(e) => browser_failure(e),
        }
    }
}
