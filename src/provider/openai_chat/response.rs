use serde_json::Value;

use crate::error::LLMError;
use crate::types::{GenerationResponse, TokenUsage};

use super::types::{OpenAiChatResponse, OpenAiUsage};

/// 将 chat/completions 响应映射为统一结构
///
/// `choices` 为空或缺失时返回 [`LLMError::EmptyResponse`]
pub(crate) fn map_response(
    resp: OpenAiChatResponse,
    vendor: &str,
) -> Result<GenerationResponse, LLMError> {
    let choices = resp.choices.unwrap_or_default();
    let Some(first) = choices.into_iter().next() else {
        return Err(LLMError::EmptyResponse {
            api: format!("{vendor} API"),
        });
    };
    let content = match first.message.and_then(|message| message.content) {
        Some(Value::String(text)) => text,
        _ => String::new(),
    };
    Ok(GenerationResponse {
        content,
        usage: resp.usage.map(convert_usage),
    })
}

pub(crate) fn convert_usage(usage: OpenAiUsage) -> TokenUsage {
    TokenUsage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> OpenAiChatResponse {
        serde_json::from_str(text).expect("valid response")
    }

    #[test]
    fn empty_choices_is_an_empty_response() {
        let err = map_response(parse(r#"{"choices":[]}"#), "DeepSeek").expect_err("empty");
        assert_eq!(err.to_string(), "No response from DeepSeek API");

        let err = map_response(parse(r#"{"id":"x"}"#), "OpenAI").expect_err("missing");
        assert!(matches!(err, LLMError::EmptyResponse { .. }));
    }

    #[test]
    fn null_content_becomes_empty_string_and_usage_passes_through() {
        let resp = parse(
            r#"{"choices":[{"message":{"role":"assistant","content":null}}],"usage":{"prompt_tokens":3}}"#,
        );
        let mapped = map_response(resp, "OpenAI").expect("mapped");
        assert_eq!(mapped.content, "");
        let usage = mapped.usage.expect("usage");
        assert_eq!(usage.prompt_tokens, Some(3));
        assert_eq!(usage.completion_tokens, None);
        assert_eq!(usage.total_tokens, None);
    }

    #[test]
    fn malformed_usage_does_not_discard_content() {
        let resp = parse(
            r#"{"choices":[{"message":{"content":"Hello!"}}],"usage":{"prompt_tokens":1,"completion_tokens":1,"total_tokens":2.0}}"#,
        );
        let mapped = map_response(resp, "OpenAI").expect("mapped");
        assert_eq!(mapped.content, "Hello!");
        let usage = mapped.usage.expect("usage");
        assert_eq!(usage.prompt_tokens, Some(1));
        assert_eq!(usage.total_tokens, None);

        let resp = parse(r#"{"choices":[{"message":{"content":"Hi"}}],"usage":"unknown"}"#);
        let mapped = map_response(resp, "OpenAI").expect("mapped");
        assert_eq!(mapped.content, "Hi");
        assert!(mapped.usage.is_none());
    }
}
