use crate::error::LLMError;
use crate::types::{GenerationResponse, TokenUsage};

use super::types::{AnthropicMessageResponse, AnthropicUsage};

/// 映射 Messages 响应 只读取第一个内容块
pub(crate) fn map_response(resp: AnthropicMessageResponse) -> Result<GenerationResponse, LLMError> {
    let blocks = resp.content.unwrap_or_default();
    let Some(first) = blocks.into_iter().next() else {
        return Err(LLMError::EmptyResponse {
            api: "Anthropic API".to_string(),
        });
    };
    Ok(GenerationResponse {
        content: first.text.unwrap_or_default(),
        usage: resp.usage.map(convert_usage),
    })
}

fn convert_usage(usage: AnthropicUsage) -> TokenUsage {
    TokenUsage {
        prompt_tokens: usage.input_tokens,
        completion_tokens: usage.output_tokens,
        total_tokens: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> AnthropicMessageResponse {
        serde_json::from_str(text).expect("valid response")
    }

    #[test]
    fn first_text_block_and_usage() {
        let resp = parse(
            r#"{"content":[{"type":"text","text":"Bonjour"},{"type":"text","text":"ignored"}],"usage":{"input_tokens":7,"output_tokens":3}}"#,
        );
        let mapped = map_response(resp).expect("mapped");
        assert_eq!(mapped.content, "Bonjour");
        let usage = mapped.usage.expect("usage");
        assert_eq!(usage.prompt_tokens, Some(7));
        assert_eq!(usage.completion_tokens, Some(3));
        assert_eq!(usage.total_tokens, None);
    }

    #[test]
    fn empty_content_is_an_empty_response() {
        let err = map_response(parse(r#"{"content":[]}"#)).expect_err("empty");
        assert_eq!(err.to_string(), "No response from Anthropic API");
    }

    #[test]
    fn malformed_usage_does_not_discard_content() {
        let resp = parse(
            r#"{"content":[{"type":"text","text":"Salut"}],"usage":{"input_tokens":-1,"output_tokens":3}}"#,
        );
        let mapped = map_response(resp).expect("mapped");
        assert_eq!(mapped.content, "Salut");
        let usage = mapped.usage.expect("usage");
        assert_eq!(usage.prompt_tokens, None);
        assert_eq!(usage.completion_tokens, Some(3));
    }
}
