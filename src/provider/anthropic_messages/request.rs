use serde_json::{Map, Value};

use crate::provider::openai_chat::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, convert_message};
use crate::types::{GenerationRequest, Role};

/// 构建 Anthropic Messages 请求体
///
/// 第一条 system 消息提升为顶层 `system` 字段 其余 system 消息被丢弃
pub(crate) fn build_anthropic_body(request: &GenerationRequest, model: &str) -> Value {
    let mut body = Map::new();
    body.insert("model".to_string(), Value::String(model.to_string()));

    let messages = request
        .messages
        .iter()
        .filter(|message| message.role != Role::System)
        .map(convert_message)
        .collect();
    body.insert("messages".to_string(), Value::Array(messages));
    body.insert(
        "max_tokens".to_string(),
        Value::from(request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
    );
    body.insert(
        "temperature".to_string(),
        Value::from(request.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
    );

    if let Some(system) = request
        .messages
        .iter()
        .find(|message| message.role == Role::System)
    {
        body.insert("system".to_string(), Value::String(system.content.clone()));
    }

    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::Message;

    #[test]
    fn first_system_message_moves_to_top_level() {
        let request = GenerationRequest::new(vec![
            Message::system("be brief"),
            Message::user("Hi"),
            Message::system("ignored"),
            Message::assistant("Hello"),
        ])
        .with_max_tokens(64);

        let body = build_anthropic_body(&request, "claude-3-haiku-20240307");
        assert_eq!(body["system"], json!("be brief"));
        assert_eq!(
            body["messages"],
            json!([
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello"}
            ])
        );
        assert_eq!(body["max_tokens"], json!(64));
        assert_eq!(body["temperature"], json!(0.7));
    }

    #[test]
    fn no_system_field_without_system_message() {
        let request = GenerationRequest::new(vec![Message::user("Hi")]);
        let body = build_anthropic_body(&request, "claude");
        assert!(body.get("system").is_none());
        assert_eq!(body["max_tokens"], json!(2000));
    }
}
