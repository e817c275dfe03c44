//! 多供应商 AI 文本生成统一调用库
//!
//! 调用方只构造一次 [`GenerationRequest`] 由 [`ProviderRegistry`] 路由到具体供应商
//! 并得到统一的 [`GenerationResponse`]

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod stream;
pub mod types;

pub use client::{ProviderRegistry, RegistryStats};
pub use config::{ApiType, ModelProfile, ProviderConfig};
pub use error::LLMError;
pub use provider::{DynProvider, LLMProvider};
pub use types::*;
