//! OpenAI 兼容的 Chat Completions 适配器

mod provider;
mod request;
mod response;
mod types;

pub use provider::OpenAiChatProvider;
pub(crate) use request::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, convert_message};
