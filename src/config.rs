//! 供应商配置 内置目录 以及配置到 Provider 的静态构建表

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::LLMError;
use crate::http::DynHttpTransport;
use crate::provider::DynProvider;
use crate::provider::anthropic_messages::AnthropicMessagesProvider;
use crate::provider::openai_chat::OpenAiChatProvider;
use crate::provider::openai_responses::OpenAiResponsesProvider;
use crate::provider::vendors::{self, CatalogProvider};

/// OpenAI 兼容接口的调用方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiType {
    #[default]
    ChatCompletions,
    Responses,
}

/// 供应商下可选的模型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ModelConfig {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            display_name: display_name.into(),
            max_tokens: None,
        }
    }
}

/// 单个供应商的完整配置 由宿主整体下发
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// 稳定标识 例如 `openai`
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub is_built_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_type: Option<ApiType>,
}

/// 配置校验结果 `valid` 与 `errors` 是否为空保持一致
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ProviderConfig {
    /// 启用且 API Key 去除空白后非空
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty()
    }

    /// 设置 API Key 并启用
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self.enabled = true;
        self
    }

    /// 收集所有违规项 不会返回错误
    ///
    /// # Examples
    ///
    /// ```
    /// use ai_relay::config::builtin_providers;
    ///
    /// let mut config = builtin_providers().remove(0);
    /// config.base_url.clear();
    /// config.enabled = true;
    /// let report = config.validate();
    /// assert!(!report.valid);
    /// assert_eq!(
    ///     report.errors,
    ///     vec!["Base URL is required", "API key is required for enabled providers"]
    /// );
    /// ```
    pub fn validate(&self) -> ConfigValidation {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Provider name is required".to_string());
        }

        if self.base_url.trim().is_empty() {
            errors.push("Base URL is required".to_string());
        } else if reqwest::Url::parse(self.base_url.trim()).is_err() {
            errors.push("Invalid base URL format".to_string());
        }

        if self.enabled && self.api_key.trim().is_empty() {
            errors.push("API key is required for enabled providers".to_string());
        }

        if self.models.is_empty() {
            errors.push("At least one model must be configured".to_string());
        }

        if self
            .temperature
            .is_some_and(|temperature| !(0.0..=2.0).contains(&temperature))
        {
            errors.push("Temperature must be between 0 and 2".to_string());
        }

        if self
            .max_tokens
            .is_some_and(|max_tokens| !(1..=100_000).contains(&max_tokens))
        {
            errors.push("Max tokens must be between 1 and 100000".to_string());
        }

        ConfigValidation {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// 供应商类型 未识别的 id 一律按 OpenAI 兼容的自定义端点处理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    OpenRouter,
    DeepSeek,
    Kimi,
    Glm,
    Custom,
}

impl ProviderKind {
    pub fn from_id(id: &str) -> Self {
        match id {
            "openai" => ProviderKind::OpenAi,
            "anthropic" => ProviderKind::Anthropic,
            "openrouter" => ProviderKind::OpenRouter,
            "deepseek" => ProviderKind::DeepSeek,
            "kimi" => ProviderKind::Kimi,
            "glm" => ProviderKind::Glm,
            _ => ProviderKind::Custom,
        }
    }

    /// 是否支持 `apiType = responses`
    pub fn supports_responses(&self) -> bool {
        matches!(self, ProviderKind::OpenAi | ProviderKind::Custom)
    }
}

/// 根据供应商 id 与凭证构建 Provider
///
/// # Errors
///
/// base_url 为空或无法解析时返回 [`LLMError::Validation`]
pub fn build_provider(
    id: &str,
    api_key: &str,
    base_url: &str,
    api_type: ApiType,
    transport: DynHttpTransport,
) -> Result<DynProvider, LLMError> {
    let base_url = base_url.trim();
    if base_url.is_empty() {
        return Err(LLMError::Validation {
            message: format!("provider {id} has no base URL"),
        });
    }
    reqwest::Url::parse(base_url).map_err(|err| LLMError::Validation {
        message: format!("provider {id} has an invalid base URL {base_url}: {err}"),
    })?;

    let kind = ProviderKind::from_id(id);
    if api_type == ApiType::Responses && kind.supports_responses() {
        return Ok(Arc::new(
            OpenAiResponsesProvider::new(transport, api_key).with_base_url(base_url),
        ));
    }

    let provider: DynProvider = match kind {
        ProviderKind::OpenAi => Arc::new(
            OpenAiChatProvider::new(transport, api_key)
                .with_base_url(base_url)
                .with_model_filter("gpt"),
        ),
        ProviderKind::Anthropic => {
            Arc::new(AnthropicMessagesProvider::new(transport, api_key).with_base_url(base_url))
        }
        ProviderKind::OpenRouter => {
            Arc::new(vendors::openrouter(transport, api_key).with_base_url(base_url))
        }
        ProviderKind::DeepSeek => {
            Arc::new(CatalogProvider::deepseek(transport, api_key).with_base_url(base_url))
        }
        ProviderKind::Kimi => {
            Arc::new(CatalogProvider::kimi(transport, api_key).with_base_url(base_url))
        }
        ProviderKind::Glm => {
            Arc::new(CatalogProvider::glm(transport, api_key).with_base_url(base_url))
        }
        ProviderKind::Custom => Arc::new(
            OpenAiChatProvider::new(transport, api_key)
                .with_base_url(base_url)
                .with_vendor("OpenAI", "custom"),
        ),
    };

    Ok(provider)
}

fn builtin(
    id: &str,
    name: &str,
    display_name: &str,
    base_url: &str,
    models: &[(&str, &str)],
    default_model: &str,
) -> ProviderConfig {
    ProviderConfig {
        id: id.to_string(),
        name: name.to_string(),
        display_name: display_name.to_string(),
        base_url: base_url.to_string(),
        api_key: String::new(),
        models: models
            .iter()
            .map(|(id, display)| ModelConfig::new(*id, *display))
            .collect(),
        enabled: false,
        is_built_in: id != "custom",
        default_model: Some(default_model.to_string()).filter(|model| !model.is_empty()),
        temperature: Some(0.7),
        max_tokens: Some(2000),
        api_type: Some(ApiType::ChatCompletions),
    }
}

/// 内置供应商目录 全部为未启用且没有 API Key
pub fn builtin_providers() -> Vec<ProviderConfig> {
    vec![
        builtin(
            "openai",
            "OpenAI",
            "OpenAI",
            "https://api.openai.com/v1",
            &[
                ("gpt-4o", "GPT-4o"),
                ("gpt-4o-mini", "GPT-4o Mini"),
                ("gpt-4-turbo", "GPT-4 Turbo"),
                ("gpt-3.5-turbo", "GPT-3.5 Turbo"),
            ],
            "gpt-4o-mini",
        ),
        builtin(
            "anthropic",
            "Anthropic",
            "Anthropic Claude",
            "https://api.anthropic.com",
            &[
                ("claude-3-5-sonnet-20241022", "Claude 3.5 Sonnet"),
                ("claude-3-haiku-20240307", "Claude 3 Haiku"),
            ],
            "claude-3-5-sonnet-20241022",
        ),
        builtin(
            "openrouter",
            "OpenRouter",
            "OpenRouter",
            vendors::OPENROUTER_BASE_URL,
            &[
                ("anthropic/claude-3.5-sonnet", "Claude 3.5 Sonnet"),
                ("openai/gpt-4o", "GPT-4o"),
                ("google/gemini-pro", "Gemini Pro"),
            ],
            "anthropic/claude-3.5-sonnet",
        ),
        builtin(
            "deepseek",
            "DeepSeek",
            "DeepSeek",
            vendors::DEEPSEEK_BASE_URL,
            &[
                ("deepseek-chat", "DeepSeek Chat"),
                ("deepseek-coder", "DeepSeek Coder"),
            ],
            "deepseek-chat",
        ),
        builtin(
            "kimi",
            "Kimi",
            "Kimi (Moonshot)",
            vendors::KIMI_BASE_URL,
            &[
                ("moonshot-v1-8k", "Moonshot v1 8K"),
                ("moonshot-v1-32k", "Moonshot v1 32K"),
                ("moonshot-v1-128k", "Moonshot v1 128K"),
            ],
            "moonshot-v1-8k",
        ),
        builtin(
            "glm",
            "GLM",
            "GLM (智谱)",
            vendors::GLM_BASE_URL,
            &[
                ("glm-4", "GLM-4"),
                ("glm-4-plus", "GLM-4 Plus"),
                ("glm-3-turbo", "GLM-3 Turbo"),
            ],
            "glm-4",
        ),
        builtin(
            "gemini",
            "Gemini",
            "Google Gemini",
            "https://generativelanguage.googleapis.com/v1beta",
            &[
                ("gemini-1.5-pro", "Gemini 1.5 Pro"),
                ("gemini-1.5-flash", "Gemini 1.5 Flash"),
                ("gemini-pro", "Gemini Pro"),
            ],
            "gemini-1.5-pro",
        ),
        builtin(
            "grok",
            "Grok",
            "xAI Grok",
            "https://api.x.ai/v1",
            &[
                ("grok-beta", "Grok Beta"),
                ("grok-vision-beta", "Grok Vision Beta"),
            ],
            "grok-beta",
        ),
        builtin(
            "ollama",
            "Ollama",
            "Ollama (本地)",
            "http://localhost:11434/v1",
            &[
                ("llama3.2", "Llama 3.2"),
                ("qwen2.5", "Qwen 2.5"),
                ("deepseek-coder-v2", "DeepSeek Coder V2"),
            ],
            "llama3.2",
        ),
        builtin(
            "lmstudio",
            "LM Studio",
            "LM Studio (本地)",
            "http://localhost:1234/v1",
            &[],
            "",
        ),
        builtin("custom", "Custom", "自定义提供商", "", &[], ""),
    ]
}

/// 模型级配置 绕过供应商配置直接调用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelProfile {
    /// 唯一 id 例如 `openai-gpt4o-1`
    pub id: String,
    /// 用户可见名称
    pub name: String,
    /// 实际请求的模型 id
    pub model_id: String,
    /// 供应商 id 决定使用哪个适配器
    pub provider: String,
    #[serde(default)]
    pub provider_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// 创建时间 毫秒时间戳
    #[serde(default)]
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_type: Option<ApiType>,
}

fn enabled_by_default() -> bool {
    true
}

/// 模型库 当前选中的模型只由 `active` 指向
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelLibrary {
    profiles: Vec<ModelProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    active: Option<String>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profiles(&self) -> &[ModelProfile] {
        &self.profiles
    }

    pub fn get(&self, id: &str) -> Option<&ModelProfile> {
        self.profiles.iter().find(|profile| profile.id == id)
    }

    /// 新增或替换同 id 的模型 第一个加入的模型自动成为当前模型
    pub fn upsert(&mut self, profile: ModelProfile) {
        if self.active.is_none() {
            self.active = Some(profile.id.clone());
        }
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }

    /// 删除模型 删除的是当前模型时改为指向剩余的第一个
    pub fn remove(&mut self, id: &str) -> Option<ModelProfile> {
        let index = self.profiles.iter().position(|profile| profile.id == id)?;
        let removed = self.profiles.remove(index);
        if self.active.as_deref() == Some(id) {
            self.active = self.profiles.first().map(|profile| profile.id.clone());
        }
        Some(removed)
    }

    /// # Errors
    ///
    /// id 不存在时返回 [`LLMError::Validation`]
    pub fn set_active(&mut self, id: &str) -> Result<(), LLMError> {
        if self.get(id).is_none() {
            return Err(LLMError::Validation {
                message: format!("model profile {id} not found"),
            });
        }
        self.active = Some(id.to_string());
        Ok(())
    }

    pub fn active(&self) -> Option<&ModelProfile> {
        self.active.as_deref().and_then(|id| self.get(id))
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.as_deref() == Some(id)
    }
}
