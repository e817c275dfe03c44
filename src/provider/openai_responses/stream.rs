use serde_json::Value;

use crate::error::LLMError;
use crate::stream::{DEFAULT_EVENT, SseDecoder};
use crate::types::TokenUsage;

use super::extract::extract_output_text;
use super::types::usage_from_value;

/// Text and usage recovered from a buffered Responses event stream.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamOutcome {
    /// Trimmed output text; empty when nothing could be recovered.
    pub content: String,
    pub usage: Option<TokenUsage>,
}

/// Accumulates deltas, fallback candidates, and the latest usage snapshot.
#[derive(Default)]
struct StreamState {
    buffer: String,
    fallbacks: Vec<String>,
    usage: Option<TokenUsage>,
}

enum Step {
    Continue,
    Completed,
}

impl StreamState {
    fn apply(&mut self, event: &str, payload: &Value) -> Result<Step, LLMError> {
        if self.usage.is_none() {
            self.usage = usage_from_value(payload.get("response").and_then(|r| r.get("usage")));
        }

        match event {
            "response.error" => Err(LLMError::Stream {
                message: stream_error_message(payload),
            }),
            "response.output_text.delta" | "response.content_part.delta" => {
                if let Some(text) = delta_text(payload).filter(|text| !text.is_empty()) {
                    self.buffer.push_str(text);
                }
                Ok(Step::Continue)
            }
            "response.output_item.added" | "response.output_item.done" => {
                self.stash(payload.get("item").unwrap_or(payload));
                Ok(Step::Continue)
            }
            "response.content_part.added" => {
                self.stash(payload.get("part").unwrap_or(payload));
                Ok(Step::Continue)
            }
            "response.completed" => {
                let response = payload.get("response").unwrap_or(payload);
                if let Some(usage) = usage_from_value(response.get("usage")) {
                    self.usage = Some(usage);
                }
                if self.buffer.trim().is_empty() {
                    self.stash(response);
                }
                Ok(Step::Completed)
            }
            _ => Ok(Step::Continue),
        }
    }

    fn stash(&mut self, value: &Value) {
        let candidate = candidate_text(value);
        if !candidate.trim().is_empty() {
            self.fallbacks.push(candidate);
        }
    }

    fn finish(self) -> StreamOutcome {
        let buffered = self.buffer.trim();
        let content = if buffered.is_empty() {
            self.fallbacks
                .iter()
                .map(|text| text.trim())
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        } else {
            buffered.to_string()
        };
        StreamOutcome {
            content,
            usage: self.usage,
        }
    }
}

/// Parses a fully buffered `text/event-stream` body produced by the Responses API.
///
/// Blocks are processed in order. `[DONE]` and `response.completed` stop processing,
/// payloads that are not valid JSON are skipped, and `response.error` aborts with
/// [`LLMError::Stream`].
///
/// # Examples
///
/// ```
/// use ai_relay::provider::openai_responses::parse_event_stream;
///
/// let body = "event: response.output_text.delta\ndata: {\"delta\":\"Hi\"}\n\ndata: [DONE]\n\n";
/// let outcome = parse_event_stream(body).unwrap();
/// assert_eq!(outcome.content, "Hi");
/// ```
pub fn parse_event_stream(text: &str) -> Result<StreamOutcome, LLMError> {
    let text = SseDecoder::normalize_line_endings(text);
    let mut state = StreamState::default();

    for event in SseDecoder::new(&text) {
        if event.is_done() {
            break;
        }
        let payload: Value = match serde_json::from_str(&event.data) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::debug!(event = %event.event, error = %err, "skipping malformed stream payload");
                continue;
            }
        };
        let name = event_name(&event.event, &payload);
        if let Step::Completed = state.apply(name, &payload)? {
            break;
        }
    }

    Ok(state.finish())
}

/// Blocks without an `event:` line fall back to the payload's `type` field.
fn event_name<'a>(declared: &'a str, payload: &'a Value) -> &'a str {
    if declared == DEFAULT_EVENT {
        payload
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or(declared)
    } else {
        declared
    }
}

fn delta_text(payload: &Value) -> Option<&str> {
    let delta = payload.get("delta");
    delta
        .and_then(|d| d.get("text"))
        .and_then(Value::as_str)
        .or_else(|| delta.and_then(Value::as_str))
        .or_else(|| payload.get("text").and_then(Value::as_str))
}

fn candidate_text(value: &Value) -> String {
    let extracted = extract_output_text(value);
    if !extracted.trim().is_empty() {
        return extracted;
    }
    // Bare content parts (`{"type":"output_text","text":"..."}`) carry text directly.
    value
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn stream_error_message(payload: &Value) -> String {
    match payload.get("error") {
        Some(error) => match error.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => match error {
                Value::String(message) => message.clone(),
                Value::Null => "Responses stream reported an error".to_string(),
                other => other.to_string(),
            },
        },
        None => "Responses stream reported an error".to_string(),
    }
}
