//! Thin authenticated JSON client for OpenAI-compatible endpoints.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use toolgate_tool_runtime::LlmError;

/// Shared by the chat and image providers.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `{base_url}{path}` and decode the JSON response.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("OpenAI request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(LlmError::AuthError);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            return Err(LlmError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = OpenAiClient::new("key".into(), "https://api.openai.com/".into());
        assert_eq!(client.base_url(), "https://api.openai.com");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = OpenAiClient::new("key".into(), "http://127.0.0.1:9".into());
        let err = client
            .post_json("/v1/chat/completions", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::NetworkError(_)));
    }
}
