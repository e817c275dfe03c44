//! Anthropic Messages 适配器

mod provider;
mod request;
mod response;
mod types;

pub use provider::AnthropicMessagesProvider;
