use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LLMError;
use crate::types::{GenerationRequest, GenerationResponse};

pub mod anthropic_messages;
pub mod openai_chat;
pub mod openai_responses;
pub mod vendors;

/// 统一的 Provider Trait 所有供应商实现该接口即可接入
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// 提交完整请求并等待归一化响应
    ///
    /// 传输层错误在返回前已经过 [`LLMError::classify`] 分类
    async fn send(&self, request: GenerationRequest) -> Result<GenerationResponse, LLMError>;

    /// 测试连通性 内部失败一律返回 `false`
    async fn test_connection(&self) -> bool;

    /// 尽力获取模型列表 失败时返回空列表或静态目录
    async fn list_models(&self) -> Vec<String>;

    /// 供应商名称
    fn name(&self) -> &'static str;
}

/// 线程安全 Provider
pub type DynProvider = Arc<dyn LLMProvider>;
