use serde_json::{Map, Value, json};

use crate::types::{GenerationRequest, Message, Role};

/// Builds the request body expected by the OpenAI Responses API.
///
/// Every message becomes an `input` item, the stream flag is always on, and sampling
/// parameters are forwarded only when the caller set them.
pub(crate) fn build_responses_body(request: &GenerationRequest, model: &str) -> Value {
    let mut body = Map::new();
    body.insert("model".to_string(), Value::String(model.to_string()));
    body.insert(
        "input".to_string(),
        Value::Array(request.messages.iter().map(convert_input_item).collect()),
    );
    body.insert("stream".to_string(), Value::Bool(true));
    if let Some(temperature) = request.temperature {
        body.insert("temperature".to_string(), Value::from(temperature));
    }
    if let Some(max_tokens) = request.max_tokens {
        body.insert("max_output_tokens".to_string(), Value::from(max_tokens));
    }
    Value::Object(body)
}

fn convert_input_item(message: &Message) -> Value {
    // Assistant turns are replayed as model output, everything else as user-side input.
    let part_type = match message.role {
        Role::Assistant => "output_text",
        Role::System | Role::User => "input_text",
    };
    json!({
        "role": message.role.as_str(),
        "content": [{ "type": part_type, "text": message.content }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_become_single_part_input_items() {
        let request = GenerationRequest::new(vec![
            Message::system("rules"),
            Message::user("question"),
            Message::assistant("earlier answer"),
        ]);
        let body = build_responses_body(&request, "gpt-4.1");
        assert_eq!(
            body,
            json!({
                "model": "gpt-4.1",
                "input": [
                    {"role": "system", "content": [{"type": "input_text", "text": "rules"}]},
                    {"role": "user", "content": [{"type": "input_text", "text": "question"}]},
                    {"role": "assistant", "content": [{"type": "output_text", "text": "earlier answer"}]}
                ],
                "stream": true
            })
        );
    }

    #[test]
    fn sampling_parameters_are_only_sent_when_present() {
        let request = GenerationRequest::new(vec![Message::user("q")])
            .with_temperature(1.2)
            .with_max_tokens(64);
        let body = build_responses_body(&request, "gpt-4.1");
        assert_eq!(body["temperature"], json!(1.2));
        assert_eq!(body["max_output_tokens"], json!(64));
        assert!(body.get("max_tokens").is_none());
    }
}
