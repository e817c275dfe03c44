use std::borrow::Cow;
use std::str::Split;

/// Name assigned to blocks that carry no `event:` line.
pub const DEFAULT_EVENT: &str = "message";

/// Sentinel payload that terminates a stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One Server-Sent Events block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Value of the `event:` field, or [`DEFAULT_EVENT`].
    pub event: String,
    /// `data:` lines joined with `\n`.
    pub data: String,
}

impl SseEvent {
    /// Returns `true` when the payload is the `[DONE]` sentinel.
    pub fn is_done(&self) -> bool {
        self.data.trim() == DONE_SENTINEL
    }
}

/// Splits a fully buffered `text/event-stream` body into ordered [`SseEvent`] values.
///
/// Blocks are separated by blank lines; empty blocks are skipped. Iteration is lazy, so
/// a consumer that stops at `[DONE]` never looks at the remaining text.
///
/// # Examples
///
/// ```
/// use ai_relay::stream::SseDecoder;
///
/// let body = "event: ping\ndata: {\"a\":1}\n\ndata: line one\ndata: line two\n\n";
/// let events: Vec<_> = SseDecoder::new(body).collect();
/// assert_eq!(events[0].event, "ping");
/// assert_eq!(events[1].event, "message");
/// assert_eq!(events[1].data, "line one\nline two");
/// ```
pub struct SseDecoder<'a> {
    blocks: Split<'a, &'static str>,
}

impl<'a> SseDecoder<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            blocks: text.split("\n\n"),
        }
    }

    /// Rewrites `\r\n` line endings so blank-line splitting works on them.
    pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
        if text.contains('\r') {
            Cow::Owned(text.replace("\r\n", "\n"))
        } else {
            Cow::Borrowed(text)
        }
    }

    fn parse_block(block: &str) -> SseEvent {
        let mut event = None;
        let mut data_lines = Vec::new();
        for line in block.lines() {
            if let Some(name) = line.strip_prefix("event:") {
                event = Some(name.trim().to_string());
            } else if let Some(data) = line.strip_prefix("data:") {
                data_lines.push(data.strip_prefix(' ').unwrap_or(data));
            }
        }
        SseEvent {
            event: event
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data: data_lines.join("\n"),
        }
    }
}

impl Iterator for SseDecoder<'_> {
    type Item = SseEvent;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let block = self.blocks.next()?.trim();
            if !block.is_empty() {
                return Some(Self::parse_block(block));
            }
        }
    }
}
