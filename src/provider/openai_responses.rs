//! OpenAI Responses 适配器 支持 `text/event-stream` 与单个 JSON 文档两种响应

mod extract;
mod provider;
mod request;
mod stream;
mod types;

pub use extract::extract_output_text;
pub use provider::OpenAiResponsesProvider;
pub use stream::{StreamOutcome, parse_event_stream};
