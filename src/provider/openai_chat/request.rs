use serde_json::{Map, Value};

use crate::types::{GenerationRequest, Message};

pub(crate) const DEFAULT_TEMPERATURE: f64 = 0.7;
pub(crate) const DEFAULT_MAX_TOKENS: u32 = 2000;

/// 构造 chat/completions 请求体 未提供的采样参数使用默认值
pub(crate) fn build_chat_body(request: &GenerationRequest, model: &str) -> Value {
    let mut body = Map::new();
    body.insert("model".to_string(), Value::String(model.to_string()));
    body.insert(
        "messages".to_string(),
        Value::Array(request.messages.iter().map(convert_message).collect()),
    );
    body.insert(
        "temperature".to_string(),
        Value::from(request.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
    );
    body.insert(
        "max_tokens".to_string(),
        Value::from(request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
    );
    body.insert("stream".to_string(), Value::Bool(false));
    Value::Object(body)
}

pub(crate) fn convert_message(message: &Message) -> Value {
    let mut obj = Map::new();
    obj.insert(
        "role".to_string(),
        Value::String(message.role.as_str().to_string()),
    );
    obj.insert("content".to_string(), Value::String(message.content.clone()));
    Value::Object(obj)
}
