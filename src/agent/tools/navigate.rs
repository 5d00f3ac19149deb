use async_trait::async_trait;
use serde_json::json;

use crate::agent::claude::ToolDefinition;
use crate::agent::tools::{browser_failure, require_param, Tool, ToolOutput};
use crate::browser::BrowserSession;
use crate::error::Result;

pub struct NavigateTool;

#[async_trait]
impl Tool for NavigateTool {
    fn name(&self) -> &str {
        "navigate"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "navigate".to_string(),
            description: "Open a URL in the browser and wait for the page to load. Returns the resulting page URL and title.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "Absolute URL to open"
                    }
                },
                "required": ["url"]
            }),
            cache_control: None,
        }
    }

    async fn execute(
        &self,
        session: &dyn BrowserSession,
        input: serde_json::Value,
    ) -> Result<ToolOutput> {
        let url = require_param!(input, "url");

        match session.navigate(url).await {
            Ok(page) => Ok(ToolOutput::Success(format!(
                "Now on {} ({})",
                page.url, page.title
            ))),
            Err(e) => browser_failure(e),
        }
    }
}
