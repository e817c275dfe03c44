use serde::Deserialize;
use serde_json::Value;

use crate::types::lenient;

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct OpenAiChatResponse {
    #[serde(default)]
    pub(crate) choices: Option<Vec<OpenAiResponseChoice>>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct OpenAiResponseChoice {
    #[serde(default)]
    pub(crate) message: Option<OpenAiResponseMessage>,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct OpenAiResponseMessage {
    /// 通常为字符串 少数兼容实现会返回 null
    #[serde(default)]
    pub(crate) content: Option<Value>,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct OpenAiUsage {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) prompt_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) completion_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) total_tokens: Option<u64>,
}

/// `GET models` 返回体
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct OpenAiModelList {
    #[serde(default)]
    pub(crate) data: Option<Vec<OpenAiModelEntry>>,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct OpenAiModelEntry {
    pub(crate) id: String,
}
