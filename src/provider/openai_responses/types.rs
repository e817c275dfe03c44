use serde::Deserialize;
use serde_json::Value;

use crate::types::{TokenUsage, lenient};

/// Responses 使用 input/output 命名 兼容网关偶尔返回 prompt/completion 命名
///
/// 两种命名同时出现时 input/output 优先
#[derive(Debug, Deserialize, Clone, Default)]
pub(crate) struct ResponsesUsage {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) output_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) prompt_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) completion_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) total_tokens: Option<u64>,
}

impl From<ResponsesUsage> for TokenUsage {
    fn from(usage: ResponsesUsage) -> Self {
        TokenUsage {
            prompt_tokens: usage.input_tokens.or(usage.prompt_tokens),
            completion_tokens: usage.output_tokens.or(usage.completion_tokens),
            total_tokens: usage.total_tokens,
        }
    }
}

/// 从任意 JSON 值中读取 usage 对象 非对象时返回 `None`
pub(crate) fn usage_from_value(value: Option<&Value>) -> Option<TokenUsage> {
    let value = value.filter(|v| v.is_object())?;
    serde_json::from_value::<ResponsesUsage>(value.clone())
        .ok()
        .map(TokenUsage::from)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn both_naming_schemes_prefer_input_output() {
        let usage = usage_from_value(Some(&json!({
            "input_tokens": 5,
            "prompt_tokens": 9,
            "completion_tokens": 4,
        })))
        .expect("usage");
        assert_eq!(usage.prompt_tokens, Some(5));
        assert_eq!(usage.completion_tokens, Some(4));
    }

    #[test]
    fn odd_counter_values_become_none() {
        let usage = usage_from_value(Some(&json!({
            "input_tokens": 2.5,
            "output_tokens": "7",
            "total_tokens": 10,
        })))
        .expect("usage");
        assert_eq!(usage.prompt_tokens, None);
        assert_eq!(usage.completion_tokens, None);
        assert_eq!(usage.total_tokens, Some(10));
        assert!(usage_from_value(Some(&json!("n/a"))).is_none());
    }
}
