use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::config::{ModelProfile, ProviderConfig, build_provider};
use crate::error::LLMError;
use crate::http::DynHttpTransport;
use crate::provider::DynProvider;
use crate::types::{GenerationRequest, GenerationResponse};

/// 没有任何默认模型时使用的模型
pub const FALLBACK_MODEL: &str = "gpt-3.5-turbo";

/// 自动选择时的优先级
const PRIORITY: &[&str] = &["openai", "anthropic", "openrouter", "deepseek", "kimi", "glm"];

/// 配置统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total: usize,
    pub enabled: usize,
    pub configured: usize,
}

/// 一次 `replace_all` 产生的不可变快照
#[derive(Default)]
struct RegistryState {
    /// 保持下发顺序
    configs: Vec<ProviderConfig>,
    providers: HashMap<String, DynProvider>,
}

impl RegistryState {
    fn build(configs: Vec<ProviderConfig>, transport: &DynHttpTransport) -> Self {
        let configs = dedupe_by_id(configs);
        let mut providers = HashMap::new();
        for config in &configs {
            if !config.is_configured() {
                continue;
            }
            match build_provider(
                &config.id,
                &config.api_key,
                &config.base_url,
                config.api_type.unwrap_or_default(),
                transport.clone(),
            ) {
                Ok(provider) => {
                    providers.insert(config.id.clone(), provider);
                }
                Err(err) => {
                    tracing::warn!(provider = %config.id, error = %err, "failed to create provider");
                }
            }
        }
        Self { configs, providers }
    }

    fn config(&self, id: &str) -> Option<&ProviderConfig> {
        self.configs.iter().find(|config| config.id == id)
    }

    fn available(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.configs
            .iter()
            .filter(|config| config.is_configured() && self.providers.contains_key(&config.id))
    }
}

/// 同一 id 出现多次时后者覆盖前者 位置保留首次出现处
fn dedupe_by_id(configs: Vec<ProviderConfig>) -> Vec<ProviderConfig> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<ProviderConfig> = Vec::with_capacity(configs.len());
    for config in configs {
        match positions.get(&config.id) {
            Some(&index) => unique[index] = config,
            None => {
                positions.insert(config.id.clone(), unique.len());
                unique.push(config);
            }
        }
    }
    unique
}

/// Provider 注册表 负责按配置构建适配器并路由请求
///
/// 配置总是整体替换 读取方只会看到完整的旧快照或完整的新快照
///
/// # Examples
///
/// ```
/// use ai_relay::client::ProviderRegistry;
/// use ai_relay::config::builtin_providers;
/// use ai_relay::http::reqwest::default_dyn_transport;
///
/// let registry = ProviderRegistry::new(default_dyn_transport().unwrap());
/// let configs = builtin_providers()
///     .into_iter()
///     .map(|config| match config.id.as_str() {
///         "glm" | "deepseek" => config.with_api_key("sk-test"),
///         _ => config,
///     })
///     .collect();
/// registry.replace_all(configs);
/// assert_eq!(registry.pick_automatic().as_deref(), Some("deepseek"));
/// ```
pub struct ProviderRegistry {
    transport: DynHttpTransport,
    state: RwLock<Arc<RegistryState>>,
}

impl ProviderRegistry {
    pub fn new(transport: DynHttpTransport) -> Self {
        Self {
            transport,
            state: RwLock::new(Arc::new(RegistryState::default())),
        }
    }

    /// 丢弃全部旧适配器 按新配置重建
    ///
    /// 只有启用且 API Key 非空的配置会构建适配器 单个失败只记录日志
    pub fn replace_all(&self, configs: Vec<ProviderConfig>) {
        let next = Arc::new(RegistryState::build(configs, &self.transport));
        tracing::debug!(
            total = next.configs.len(),
            available = next.providers.len(),
            "provider registry replaced"
        );
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn snapshot(&self) -> Arc<RegistryState> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 发送请求 缺省的模型与采样参数由供应商配置补齐
    ///
    /// # Errors
    ///
    /// 供应商不可用时返回 [`LLMError::ProviderNotFound`] 适配器错误原样返回
    pub async fn send(
        &self,
        provider_id: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, LLMError> {
        let state = self.snapshot();
        let provider = state
            .providers
            .get(provider_id)
            .cloned()
            .ok_or_else(|| LLMError::ProviderNotFound {
                provider: provider_id.to_string(),
            })?;
        let config = state
            .config(provider_id)
            .ok_or_else(|| LLMError::ConfigNotFound {
                provider: provider_id.to_string(),
            })?;

        let model = config
            .default_model
            .as_deref()
            .filter(|model| !model.trim().is_empty())
            .or_else(|| config.models.first().map(|model| model.id.as_str()))
            .unwrap_or(FALLBACK_MODEL);
        let request = request.with_defaults(Some(model), config.temperature, config.max_tokens);

        tracing::debug!(provider = provider_id, model = ?request.model, "routing request");
        provider.send(request).await
    }

    /// 使用模型级配置临时构建适配器发送请求 不经过注册表
    ///
    /// # Errors
    ///
    /// 模型缺少 apiKey 或 baseUrl 时返回 [`LLMError::Validation`]
    pub async fn send_with_model(
        &self,
        profile: &ModelProfile,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, LLMError> {
        if profile.api_key.trim().is_empty() || profile.base_url.trim().is_empty() {
            return Err(LLMError::Validation {
                message: "Model missing apiKey or baseUrl".to_string(),
            });
        }
        let provider = build_provider(
            &profile.provider,
            &profile.api_key,
            &profile.base_url,
            profile.api_type.unwrap_or_default(),
            self.transport.clone(),
        )?;
        let model = Some(profile.model_id.as_str()).filter(|model| !model.trim().is_empty());
        let request = request.with_defaults(model, profile.temperature, profile.max_tokens);
        provider.send(request).await
    }

    /// 按固定优先级挑选可用供应商 都不可用时取第一个可用的
    pub fn pick_automatic(&self) -> Option<String> {
        let state = self.snapshot();
        let available: Vec<&ProviderConfig> = state.available().collect();
        PRIORITY
            .iter()
            .find(|id| available.iter().any(|config| config.id == **id))
            .map(|id| id.to_string())
            .or_else(|| available.first().map(|config| config.id.clone()))
    }

    /// 已启用 已配置且适配器构建成功的供应商
    pub fn available_providers(&self) -> Vec<ProviderConfig> {
        self.snapshot().available().cloned().collect()
    }

    pub fn provider_config(&self, id: &str) -> Option<ProviderConfig> {
        self.snapshot().config(id).cloned()
    }

    /// 供应商不存在时返回 `false`
    pub async fn test_provider(&self, id: &str) -> bool {
        let provider = self.snapshot().providers.get(id).cloned();
        match provider {
            Some(provider) => provider.test_connection().await,
            None => false,
        }
    }

    /// 适配器没有返回模型时使用配置中的模型 id
    pub async fn provider_models(&self, id: &str) -> Vec<String> {
        let state = self.snapshot();
        let Some(provider) = state.providers.get(id).cloned() else {
            return Vec::new();
        };
        let models = provider.list_models().await;
        if !models.is_empty() {
            return models;
        }
        state
            .config(id)
            .map(|config| config.models.iter().map(|model| model.id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> RegistryStats {
        let state = self.snapshot();
        RegistryStats {
            total: state.configs.len(),
            enabled: state.configs.iter().filter(|config| config.enabled).count(),
            configured: state
                .configs
                .iter()
                .filter(|config| config.is_configured())
                .count(),
        }
    }
}
