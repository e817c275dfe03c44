use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::LLMError;
use crate::http::{ApiClient, DynHttpTransport, HttpResponse, bearer_headers};
use crate::provider::LLMProvider;
use crate::types::{GenerationRequest, GenerationResponse};

use super::extract::{explicit_error, extract_output_text};
use super::request::build_responses_body;
use super::stream::{StreamOutcome, parse_event_stream};
use super::types::usage_from_value;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const RESPONSES_ENDPOINT: &str = "responses";
const MODELS_ENDPOINT: &str = "models";
const API_LABEL: &str = "OpenAI Responses API";

/// OpenAI Responses API Provider
///
/// 请求总是带 `stream: true` 但响应体整体缓冲后再解析 兼容直接返回 JSON 的网关
pub struct OpenAiResponsesProvider {
    client: ApiClient,
    api_key: String,
}

impl OpenAiResponsesProvider {
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        Self {
            client: ApiClient::new(transport, DEFAULT_BASE_URL),
            api_key: api_key.into(),
        }
    }

    /// 自定义 base_url
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }

    fn build_headers(&self) -> HashMap<String, String> {
        let mut headers = bearer_headers(&self.api_key);
        headers.insert(
            "Accept".to_string(),
            "text/event-stream, application/json".to_string(),
        );
        headers
    }

    async fn complete(&self, request: GenerationRequest) -> Result<GenerationResponse, LLMError> {
        let model = request
            .model_name()
            .map(str::to_string)
            .ok_or_else(|| LLMError::Validation {
                message: "model is required for the Responses API".to_string(),
            })?;
        let body = build_responses_body(&request, &model);
        let response = self
            .client
            .post(RESPONSES_ENDPOINT, &body, self.build_headers())
            .await
            .map_err(LLMError::classify)?;

        let text = response.text();
        let outcome = if is_event_stream(&response, &text) {
            parse_event_stream(&text)?
        } else {
            parse_json_body(&text)?
        };

        if outcome.content.is_empty() {
            return Err(LLMError::EmptyResponse {
                api: API_LABEL.to_string(),
            });
        }
        Ok(GenerationResponse {
            content: outcome.content,
            usage: outcome.usage,
        })
    }
}

fn is_event_stream(response: &HttpResponse, text: &str) -> bool {
    let declared = response
        .header("content-type")
        .is_some_and(|value| value.to_ascii_lowercase().contains("text/event-stream"));
    let trimmed = text.trim_start();
    declared || trimmed.starts_with("event:") || trimmed.starts_with("data:")
}

fn parse_json_body(text: &str) -> Result<StreamOutcome, LLMError> {
    let value: Value = serde_json::from_str(text).map_err(|err| LLMError::Provider {
        provider: "openai_responses",
        message: format!("failed to parse {API_LABEL} response: {err}"),
    })?;
    if let Some(message) = explicit_error(&value) {
        return Err(LLMError::Provider {
            provider: "openai_responses",
            message,
        });
    }
    Ok(StreamOutcome {
        content: extract_output_text(&value).trim().to_string(),
        usage: usage_from_value(value.get("usage")),
    })
}

#[async_trait]
impl LLMProvider for OpenAiResponsesProvider {
    async fn send(&self, request: GenerationRequest) -> Result<GenerationResponse, LLMError> {
        self.complete(request).await
    }

    async fn test_connection(&self) -> bool {
        match self.client.get(MODELS_ENDPOINT, self.build_headers()).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(provider = "openai_responses", error = %err, "connection test failed");
                false
            }
        }
    }

    /// Responses 端点没有模型目录 由配置中的模型列表兜底
    async fn list_models(&self) -> Vec<String> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "openai_responses"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(content_type: Option<&str>) -> HttpResponse {
        let mut headers = HashMap::new();
        if let Some(value) = content_type {
            headers.insert("Content-Type".to_string(), value.to_string());
        }
        HttpResponse {
            status: 200,
            headers,
            body: Vec::new(),
        }
    }

    #[test]
    fn event_stream_detection_uses_header_or_body_prefix() {
        assert!(is_event_stream(
            &response(Some("text/event-stream; charset=utf-8")),
            "{}"
        ));
        assert!(is_event_stream(&response(None), "\n data: {}"));
        assert!(is_event_stream(&response(None), "event: response.created"));
        assert!(!is_event_stream(
            &response(Some("application/json")),
            "{\"output_text\":\"hi\"}"
        ));
    }

    #[test]
    fn json_body_with_error_message_fails() {
        let err = parse_json_body("{\"error\":{\"message\":\"model not found\"}}")
            .expect_err("error body");
        assert!(matches!(err, LLMError::Provider { provider: "openai_responses", .. }));
        assert_eq!(err.to_string(), "model not found");
    }

    #[test]
    fn json_body_extracts_text_and_usage() {
        let outcome = parse_json_body(
            "{\"output_text\":\" hi \",\"usage\":{\"prompt_tokens\":3,\"completion_tokens\":4}}",
        )
        .expect("json body");
        assert_eq!(outcome.content, "hi");
        let usage = outcome.usage.expect("usage");
        assert_eq!(usage.prompt_tokens, Some(3));
        assert_eq!(usage.completion_tokens, Some(4));
    }
}
