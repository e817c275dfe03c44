use serde::Deserialize;

use crate::types::lenient;

/// Non-streaming response payload returned by Anthropic Messages.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AnthropicMessageResponse {
    /// Ordered list of content blocks; only the first one is read.
    #[serde(default)]
    pub(crate) content: Option<Vec<AnthropicContentBlock>>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) usage: Option<AnthropicUsage>,
}

/// Single content block. Non-text blocks carry no `text`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AnthropicContentBlock {
    #[serde(default)]
    pub(crate) text: Option<String>,
}

/// Usage counters returned by Anthropic.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AnthropicUsage {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) output_tokens: Option<u64>,
}
