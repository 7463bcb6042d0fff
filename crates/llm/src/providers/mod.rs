pub mod openai;
pub mod openai_images;

use std::sync::Arc;

use toolgate_core::config::LlmConfig;
use toolgate_tool_runtime::{ImageGenerator, LlmError, ToolAwareLlmProvider};

use crate::client::OpenAiClient;

fn client_from_config(llm_config: &LlmConfig) -> Result<OpenAiClient, LlmError> {
    let api_key = llm_config
        .api_key
        .as_ref()
        .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
    Ok(OpenAiClient::new(api_key.clone(), llm_config.base_url.clone()))
}

/// Create the chat transport described by config.
pub fn create_provider(llm_config: &LlmConfig) -> Result<Arc<dyn ToolAwareLlmProvider>, LlmError> {
    let client = client_from_config(llm_config)?;
    Ok(Arc::new(openai::OpenAiProvider::new(
        client,
        llm_config.model.clone(),
        llm_config.temperature,
        llm_config.system_prompt.clone(),
    )))
}

/// Create the image backend for the `generate_image` tool.
pub fn create_image_generator(llm_config: &LlmConfig) -> Result<Arc<dyn ImageGenerator>, LlmError> {
    let client = client_from_config(llm_config)?;
    Ok(Arc::new(openai_images::OpenAiImageGenerator::new(
        client,
        llm_config.image_model.clone(),
    )))
}
