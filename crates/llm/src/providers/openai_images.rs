use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use toolgate_tool_runtime::ImageGenerator;

use crate::client::OpenAiClient;

/// OpenAI images API backend: one square image per prompt, returned as a URL.
pub struct OpenAiImageGenerator {
    client: OpenAiClient,
    model: String,
}

impl OpenAiImageGenerator {
    pub fn new(client: OpenAiClient, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<Option<String>> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024",
        });
        let resp = self.client.post_json("/v1/images/generations", &body).await?;
        let url = resp["data"][0]["url"].as_str().map(String::from);
        debug!(model = %self.model, has_url = url.is_some(), "Image generation finished");
        Ok(url)
    }
}
