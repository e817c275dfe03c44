use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::LLMError;
use crate::http::{ApiClient, DynHttpTransport, HttpResponse, bearer_headers};
use crate::provider::LLMProvider;
use crate::types::{GenerationRequest, GenerationResponse};

use super::request::build_chat_body;
use super::response::map_response;
use super::types::{OpenAiChatResponse, OpenAiModelList};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const CHAT_ENDPOINT: &str = "chat/completions";
const MODELS_ENDPOINT: &str = "models";

/// OpenAI 兼容 Chat Completions Provider
///
/// OpenAI 本身、自定义端点以及 DeepSeek/Kimi/GLM/OpenRouter 都复用这一实现
pub struct OpenAiChatProvider {
    pub(crate) client: ApiClient,
    pub(crate) api_key: String,
    pub(crate) vendor: &'static str,
    pub(crate) name: &'static str,
    pub(crate) model_filter: Option<&'static str>,
}

impl OpenAiChatProvider {
    /// 创建带默认 base_url 的 Provider
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        Self {
            client: ApiClient::new(transport, DEFAULT_BASE_URL),
            api_key: api_key.into(),
            vendor: "OpenAI",
            name: "openai_chat",
            model_filter: None,
        }
    }

    /// 自定义 base_url
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }

    /// 设置错误信息中使用的供应商名称以及 Provider 名称
    pub fn with_vendor(mut self, vendor: &'static str, name: &'static str) -> Self {
        self.vendor = vendor;
        self.name = name;
        self
    }

    /// 为每次请求追加固定 header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.client = self.client.with_header(name, value);
        self
    }

    /// 仅保留 id 包含指定片段的模型
    pub fn with_model_filter(mut self, filter: &'static str) -> Self {
        self.model_filter = Some(filter);
        self
    }

    fn build_headers(&self) -> HashMap<String, String> {
        let mut headers = bearer_headers(&self.api_key);
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers
    }

    fn resolve_model(&self, request: &GenerationRequest) -> Result<String, LLMError> {
        request
            .model_name()
            .map(str::to_string)
            .ok_or_else(|| LLMError::Validation {
                message: format!("model is required for {} chat completions", self.vendor),
            })
    }

    fn try_parse<T: DeserializeOwned>(&self, response: &HttpResponse) -> Result<T, LLMError> {
        serde_json::from_slice(&response.body).map_err(|err| LLMError::Provider {
            provider: self.name,
            message: format!("failed to parse {} response: {err}", self.vendor),
        })
    }

    async fn complete(&self, request: GenerationRequest) -> Result<GenerationResponse, LLMError> {
        let model = self.resolve_model(&request)?;
        let body = build_chat_body(&request, &model);
        let response = self
            .client
            .post(CHAT_ENDPOINT, &body, self.build_headers())
            .await
            .map_err(LLMError::classify)?;
        let parsed: OpenAiChatResponse = self.try_parse(&response)?;
        map_response(parsed, self.vendor)
    }

    /// 发送 1 token 的最小请求 用于没有模型列表接口的供应商
    pub(crate) async fn probe_completion(&self, model: &str) -> Result<(), LLMError> {
        let body = json!({
            "model": model,
            "messages": [{"role": "user", "content": "Hi"}],
            "max_tokens": 1
        });
        self.client
            .post(CHAT_ENDPOINT, &body, self.build_headers())
            .await?;
        Ok(())
    }

    pub(crate) async fn fetch_models(&self) -> Result<Vec<String>, LLMError> {
        let response = self
            .client
            .get(MODELS_ENDPOINT, self.build_headers())
            .await?;
        let parsed: OpenAiModelList = self.try_parse(&response)?;
        Ok(parsed
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|entry| entry.id)
            .collect())
    }
}

#[async_trait]
impl LLMProvider for OpenAiChatProvider {
    async fn send(&self, request: GenerationRequest) -> Result<GenerationResponse, LLMError> {
        self.complete(request).await
    }

    async fn test_connection(&self) -> bool {
        match self.fetch_models().await {
            Ok(models) => !models.is_empty(),
            Err(err) => {
                tracing::warn!(provider = self.name, error = %err, "connection test failed");
                false
            }
        }
    }

    async fn list_models(&self) -> Vec<String> {
        match self.fetch_models().await {
            Ok(models) => {
                let mut models: Vec<String> = models
                    .into_iter()
                    .filter(|id| self.model_filter.is_none_or(|filter| id.contains(filter)))
                    .collect();
                models.sort();
                models
            }
            Err(err) => {
                tracing::warn!(provider = self.name, error = %err, "failed to fetch models");
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
