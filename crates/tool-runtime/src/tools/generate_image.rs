//! Image generation tool, backed by a pluggable image service.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::permission::GENERATE_IMAGE;
use crate::tool::{Tool, ToolContext, ToolDefinition, ToolError};

/// An external service that turns a prompt into a hosted image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// URL of the generated image, or `None` if the service returned no usable result.
    async fn generate(&self, prompt: &str) -> anyhow::Result<Option<String>>;
}

/// Generate an image from a prompt. Sensitive under the default policy.
pub struct GenerateImageTool {
    generator: Arc<dyn ImageGenerator>,
}

impl GenerateImageTool {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Tool for GenerateImageTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: GENERATE_IMAGE.to_string(),
            description: "generate an image".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "prompt": {
                        "type": "string",
                        "description": "Prompt for the image. Consider the user's message when creating it."
                    }
                },
                "required": ["prompt"],
                "additionalProperties": false
            }),
        }
    }

    async fn execute(&self, arguments: Value, _context: &ToolContext) -> Result<String, ToolError> {
        let prompt = arguments
            .get("prompt")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidInput("missing 'prompt' field".to_string()))?;

        debug!(prompt_len = prompt.len(), "Generating image");
        self.generator.generate(prompt).await?.ok_or_else(|| {
            ToolError::ExecutionFailed("image service did not return a URL".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedGenerator(Option<&'static str>);

    #[async_trait]
    impl ImageGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<Option<String>> {
            Ok(self.0.map(String::from))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl ImageGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("service unavailable")
        }
    }

    #[tokio::test]
    async fn test_returns_image_url() {
        let tool = GenerateImageTool::new(Arc::new(FixedGenerator(Some("https://img/cat.png"))));
        let url = tool
            .execute(json!({"prompt": "a cat"}), &ToolContext::default())
            .await
            .unwrap();
        assert_eq!(url, "https://img/cat.png");
    }

    #[tokio::test]
    async fn test_missing_url_is_execution_failure() {
        let tool = GenerateImageTool::new(Arc::new(FixedGenerator(None)));
        let err = tool
            .execute(json!({"prompt": "a cat"}), &ToolContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed(_)));
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let tool = GenerateImageTool::new(Arc::new(FailingGenerator));
        let err = tool
            .execute(json!({"prompt": "a cat"}), &ToolContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Other(_)));
    }

    #[tokio::test]
    async fn test_requires_prompt() {
        let tool = GenerateImageTool::new(Arc::new(FixedGenerator(Some("u"))));
        let err = tool.execute(json!({}), &ToolContext::default()).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
        assert_eq!(tool.definition().name, "generate_image");
    }
}
