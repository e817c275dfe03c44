//! Text extraction for non-streamed Responses payloads.
//!
//! Gateways that front the Responses API disagree on where the generated text lives, so
//! the extractor tries a fixed list of locations and keeps the first non-empty one:
//!
//! 1. `output_text` as a string or an array of strings
//! 2. the first usable element of `output`: a bare string, the text parts of its
//!    `content` array, or `content.text`
//! 3. `result`, coerced to a string
//! 4. `message.content` as a string or an array
//! 5. top-level `content` as a string or an array of strings / `{text|content}` objects

use serde_json::Value;

/// Returns the generated text found in `value`, or an empty string.
///
/// # Examples
///
/// ```
/// use ai_relay::provider::openai_responses::extract_output_text;
/// use serde_json::json;
///
/// let body = json!({"output": [{"content": [{"text": "A"}, {"text": "B"}]}]});
/// assert_eq!(extract_output_text(&body), "A\nB");
/// ```
pub fn extract_output_text(value: &Value) -> String {
    let strategies: [fn(&Value) -> Option<String>; 5] = [
        from_output_text,
        from_output_items,
        from_result,
        from_message_content,
        from_content,
    ];
    strategies
        .iter()
        .find_map(|strategy| strategy(value).filter(|text| !text.trim().is_empty()))
        .unwrap_or_default()
}

/// Vendor error carried inside an otherwise successful body.
pub(crate) fn explicit_error(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .or_else(|| value.get("message").and_then(Value::as_str))
        .map(str::to_string)
}

fn from_output_text(value: &Value) -> Option<String> {
    match value.get("output_text")? {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        _ => None,
    }
}

fn from_output_items(value: &Value) -> Option<String> {
    value
        .get("output")?
        .as_array()?
        .iter()
        .find_map(|item| text_of_output_item(item).filter(|text| !text.trim().is_empty()))
}

fn text_of_output_item(item: &Value) -> Option<String> {
    if let Value::String(text) = item {
        return Some(text.clone());
    }
    match item.get("content")? {
        Value::Array(parts) => {
            let joined = join_text_parts(parts, &["text"]);
            if joined.trim().is_empty() {
                None
            } else {
                Some(joined)
            }
        }
        Value::Object(content) => content.get("text").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn from_result(value: &Value) -> Option<String> {
    match value.get("result")? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn from_message_content(value: &Value) -> Option<String> {
    match value.get("message")?.get("content")? {
        Value::String(text) => Some(text.clone()),
        Value::Array(parts) => Some(join_text_parts(parts, &["text"])),
        _ => None,
    }
}

fn from_content(value: &Value) -> Option<String> {
    match value.get("content")? {
        Value::String(text) => Some(text.clone()),
        Value::Array(parts) => Some(join_text_parts(parts, &["text", "content"])),
        _ => None,
    }
}

/// Joins string parts and the first string field among `keys` of object parts.
fn join_text_parts(parts: &[Value], keys: &[&str]) -> String {
    parts
        .iter()
        .filter_map(|part| match part {
            Value::String(text) => Some(text.as_str()),
            Value::Object(obj) => keys
                .iter()
                .find_map(|key| obj.get(*key).and_then(Value::as_str)),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn output_text_wins_over_later_strategies() {
        let body = json!({"output_text": ["one", "two"], "result": "ignored"});
        assert_eq!(extract_output_text(&body), "one\ntwo");
    }

    #[test]
    fn output_items_skip_unusable_elements() {
        let body = json!({
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "content": {"text": "nested"}}
            ]
        });
        assert_eq!(extract_output_text(&body), "nested");

        let body = json!({"output": ["bare"]});
        assert_eq!(extract_output_text(&body), "bare");
    }

    #[test]
    fn result_is_coerced_to_string() {
        assert_eq!(extract_output_text(&json!({"result": 42})), "42");
        assert_eq!(extract_output_text(&json!({"result": "done"})), "done");
    }

    #[test]
    fn message_and_content_fallbacks() {
        let body = json!({"message": {"content": [{"text": "x"}, "y"]}});
        assert_eq!(extract_output_text(&body), "x\ny");

        let body = json!({"content": ["a", {"content": "b"}, {"text": "c"}]});
        assert_eq!(extract_output_text(&body), "a\nb\nc");
    }

    #[test]
    fn empty_strategies_fall_through() {
        let body = json!({"output_text": "  ", "content": "fallback"});
        assert_eq!(extract_output_text(&body), "fallback");
        assert_eq!(extract_output_text(&json!({"status": "completed"})), "");
    }

    #[test]
    fn explicit_error_reads_nested_and_top_level_messages() {
        assert_eq!(
            explicit_error(&json!({"error": {"message": "quota"}})).as_deref(),
            Some("quota")
        );
        assert_eq!(
            explicit_error(&json!({"message": "bad gateway"})).as_deref(),
            Some("bad gateway")
        );
        assert_eq!(explicit_error(&json!({"error": null, "output": []})), None);
        assert_eq!(explicit_error(&json!({"message": {"content": "hi"}})), None);
    }
}
