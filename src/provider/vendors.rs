//! OpenAI 兼容供应商 通过组合复用 Chat Completions 实现

use async_trait::async_trait;

use crate::error::LLMError;
use crate::http::DynHttpTransport;
use crate::provider::LLMProvider;
use crate::provider::openai_chat::OpenAiChatProvider;
use crate::types::{GenerationRequest, GenerationResponse};

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const KIMI_BASE_URL: &str = "https://api.moonshot.cn/v1";
pub const GLM_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

const OPENROUTER_REFERER: &str = "https://github.com/yourusername/obsidian-at-ai";
const OPENROUTER_TITLE: &str = "@AI Obsidian Plugin";

/// 连通性测试方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionProbe {
    /// 沿用 `GET models` 非空即视为可用
    ListModels,
    /// 对指定模型发送 1 token 的请求
    MinimalCompletion(&'static str),
}

/// 模型目录固定的 Chat Completions 供应商
pub struct CatalogProvider {
    inner: OpenAiChatProvider,
    models: &'static [&'static str],
    probe: ConnectionProbe,
}

impl CatalogProvider {
    pub fn new(
        inner: OpenAiChatProvider,
        models: &'static [&'static str],
        probe: ConnectionProbe,
    ) -> Self {
        Self {
            inner,
            models,
            probe,
        }
    }

    /// DeepSeek
    pub fn deepseek(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        let inner = OpenAiChatProvider::new(transport, api_key)
            .with_base_url(DEEPSEEK_BASE_URL)
            .with_vendor("OpenAI", "deepseek");
        Self::new(
            inner,
            &["deepseek-chat", "deepseek-coder"],
            ConnectionProbe::ListModels,
        )
    }

    /// Kimi (Moonshot)
    pub fn kimi(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        let inner = OpenAiChatProvider::new(transport, api_key)
            .with_base_url(KIMI_BASE_URL)
            .with_vendor("OpenAI", "kimi");
        Self::new(
            inner,
            &["moonshot-v1-8k", "moonshot-v1-32k", "moonshot-v1-128k"],
            ConnectionProbe::ListModels,
        )
    }

    /// 智谱 GLM 没有可用的 models 接口
    pub fn glm(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        let inner = OpenAiChatProvider::new(transport, api_key)
            .with_base_url(GLM_BASE_URL)
            .with_vendor("GLM", "glm");
        Self::new(
            inner,
            &["glm-4", "glm-4-plus", "glm-3-turbo"],
            ConnectionProbe::MinimalCompletion("glm-3-turbo"),
        )
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.inner = self.inner.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl LLMProvider for CatalogProvider {
    async fn send(&self, request: GenerationRequest) -> Result<GenerationResponse, LLMError> {
        self.inner.send(request).await
    }

    async fn test_connection(&self) -> bool {
        match self.probe {
            ConnectionProbe::ListModels => self.inner.test_connection().await,
            ConnectionProbe::MinimalCompletion(model) => {
                match self.inner.probe_completion(model).await {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::warn!(provider = self.name(), error = %err, "connection test failed");
                        false
                    }
                }
            }
        }
    }

    async fn list_models(&self) -> Vec<String> {
        self.models.iter().map(|model| model.to_string()).collect()
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// OpenRouter 在每次调用上追加 `HTTP-Referer` 与 `X-Title`
///
/// 模型列表与 OpenAI 一样只保留 id 含 `gpt` 的条目
pub fn openrouter(transport: DynHttpTransport, api_key: impl Into<String>) -> OpenAiChatProvider {
    OpenAiChatProvider::new(transport, api_key)
        .with_base_url(OPENROUTER_BASE_URL)
        .with_vendor("OpenAI", "openrouter")
        .with_header("HTTP-Referer", OPENROUTER_REFERER)
        .with_header("X-Title", OPENROUTER_TITLE)
        .with_model_filter("gpt")
}
