use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;

use crate::error::LLMError;
use crate::http::{ApiClient, DynHttpTransport, bearer_headers};
use crate::provider::LLMProvider;
use crate::types::{GenerationRequest, GenerationResponse};

use super::request::build_anthropic_body;
use super::response::map_response;
use super::types::AnthropicMessageResponse;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_VERSION: &str = "2023-06-01";
const MESSAGES_ENDPOINT: &str = "v1/messages";
const PROBE_MODEL: &str = "claude-3-haiku-20240307";

/// Messages API 没有公开的模型列表接口
const KNOWN_MODELS: &[&str] = &[
    "claude-3-5-sonnet-20241022",
    "claude-3-opus-20240229",
    "claude-3-sonnet-20240229",
    "claude-3-haiku-20240307",
];

/// Anthropic Messages Provider（兼容 Claude 3.x Messages API）
pub struct AnthropicMessagesProvider {
    client: ApiClient,
    api_key: String,
    version: String,
}

impl AnthropicMessagesProvider {
    /// 使用默认 base_url 与 anthropic-version 创建 Provider
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        Self {
            client: ApiClient::new(transport, DEFAULT_BASE_URL),
            api_key: api_key.into(),
            version: DEFAULT_VERSION.to_string(),
        }
    }

    /// 自定义 base_url，便于接入代理或兼容层
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }

    /// 自定义 Anthropic API 版本（anthropic-version）
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    fn build_headers(&self) -> HashMap<String, String> {
        let mut headers = bearer_headers(&self.api_key);
        headers.insert("x-api-key".to_string(), self.api_key.clone());
        headers.insert("anthropic-version".to_string(), self.version.clone());
        headers
    }

    async fn complete(&self, request: GenerationRequest) -> Result<GenerationResponse, LLMError> {
        let model = request
            .model_name()
            .map(str::to_string)
            .ok_or_else(|| LLMError::Validation {
                message: "model is required for Anthropic Messages".to_string(),
            })?;
        let body = build_anthropic_body(&request, &model);
        let response = self
            .client
            .post(MESSAGES_ENDPOINT, &body, self.build_headers())
            .await
            .map_err(LLMError::classify)?;
        let parsed: AnthropicMessageResponse =
            serde_json::from_slice(&response.body).map_err(|err| LLMError::Provider {
                provider: "anthropic_messages",
                message: format!("failed to parse Anthropic response: {err}"),
            })?;
        map_response(parsed)
    }
}

#[async_trait]
impl LLMProvider for AnthropicMessagesProvider {
    async fn send(&self, request: GenerationRequest) -> Result<GenerationResponse, LLMError> {
        self.complete(request).await
    }

    async fn test_connection(&self) -> bool {
        let body = json!({
            "model": PROBE_MODEL,
            "messages": [{"role": "user", "content": "Hi"}],
            "max_tokens": 1
        });
        match self
            .client
            .post(MESSAGES_ENDPOINT, &body, self.build_headers())
            .await
        {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(provider = "anthropic_messages", error = %err, "connection test failed");
                false
            }
        }
    }

    async fn list_models(&self) -> Vec<String> {
        KNOWN_MODELS.iter().map(|model| model.to_string()).collect()
    }

    fn name(&self) -> &'static str {
        "anthropic_messages"
    }
}
