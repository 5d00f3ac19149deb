pub mod click;
pub mod extract_text;
pub mod navigate;
pub mod resolve_obstacle;
pub mod type_text;
pub mod wait_for;

use async_trait::async_trait;

use crate::agent::claude::ToolDefinition;
use crate::browser::{BrowserError, BrowserSession};
use crate::error::Result;

/// Extract a required string parameter from tool input, or hand the decision
/// engine an error result it can react to.
macro_rules! require_param {
    ($input:expr, $name:literal) => {
        match $input.get($name).and_then(|v| v.as_str()) {
            Some(value) => value,
            None => {
                return Ok($crate::agent::tools::ToolOutput::Error(format!(
                    "Missing required parameter: {}",
                    $name
                )))
            }
        }
    };
}
pub(crate) use require_param;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn definition(&self) -> ToolDefinition;
    async fn execute(
        &self,
        session: &dyn BrowserSession,
        input: serde_json::Value,
    ) -> Result<ToolOutput>;
}

pub enum ToolOutput {
    /// Normal text result returned to the decision engine.
    Success(String),
    /// Recoverable action failure; the engine decides whether to retry.
    Error(String),
    /// Special signal: the engine reported an interstitial it is remediating.
    ObstacleReported { description: String },
}

/// Recoverable session failures become error results the engine can react
/// to; fatal ones propagate and abort the run.
pub(crate) fn browser_failure(e: BrowserError) -> Result<ToolOutput> {
    if e.is_fatal() {
        Err(e.into())
    } else {
        Ok(ToolOutput::Error(e.to_string()))
    }
}

pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(max_page_text: usize) -> Self {
        let tools: Vec<Box<dyn Tool>> = vec![
            Box::new(navigate::NavigateTool),
            Box::new(click::ClickTool),
            Box::new(type_text::TypeTextTool),
            Box::new(wait_for::WaitForTool),
            Box::new(extract_text::ExtractTextTool::new(max_page_text)),
            Box::new(resolve_obstacle::ResolveObstacleTool),
        ];

        Self { tools }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakeSession;
    use serde_json::json;

    #[tokio::test]
    async fn test_registry_resolves_every_definition() {
        let registry = ToolRegistry::new(1000);
        for definition in registry.definitions() {
            assert!(registry.get(&definition.name).is_some());
        }
        assert!(registry.get("no_such_tool").is_none());
    }

    #[tokio::test]
    async fn test_missing_parameter_is_a_tool_error() {
        let registry = ToolRegistry::new(1000);
        let session = FakeSession::default();
        let tool = registry.get("navigate").unwrap();

        let output = tool.execute(&session, json!({})).await.unwrap();
        match output {
            ToolOutput::Error(message) => assert!(message.contains("url")),
            _ => panic!("expected an error result"),
        }
    }

    #[tokio::test]
    async fn test_extract_text_truncates_long_pages() {
        let session = FakeSession::with_page_text(&"x".repeat(500));
        let tool = extract_text::ExtractTextTool::new(100);

        let output = tool.execute(&session, json!({})).await.unwrap();
        match output {
            ToolOutput::Success(text) => {
                assert!(text.contains("truncated"));
                assert!(text.len() < 200);
            }
            _ => panic!("expected a success result"),
        }
    }

    #[tokio::test]
    async fn test_absent_element_is_recoverable() {
        let session = FakeSession {
            missing_selectors: vec!["#gone".to_string()],
            ..Default::default()
        };
        let registry = ToolRegistry::new(1000);
        let tool = registry.get("click").unwrap();

        let output = tool
            .execute(&session, json!({ "selector": "#gone" }))
            .await
            .unwrap();
        assert!(matches!(output, ToolOutput::Error(_)));
    }
}
