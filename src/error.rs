use thiserror::Error;

/// Aggregates every failure mode exposed by the provider layer.
///
/// `Http` and `Transport` are raw transport failures. Adapters run them through
/// [`LLMError::classify`] before they leave the provider boundary, so callers normally
/// only observe the classified variants.
#[derive(Debug, Error)]
pub enum LLMError {
    /// Non-success HTTP status together with the raw response body.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// Connection-level failure reported by the underlying HTTP backend.
    #[error("transport error: {message}")]
    Transport { message: String },
    /// Credentials were rejected (401/403).
    #[error("API key authentication failed")]
    Authentication,
    /// The vendor throttled the request or the account ran out of quota (429).
    #[error("API quota exceeded")]
    QuotaExceeded,
    /// The request did not complete in time.
    #[error("Request timeout")]
    Timeout,
    /// The connection could not be established.
    #[error("Network connection error")]
    Network,
    /// No adapter is registered for the provider id.
    #[error("Provider {provider} not found or not enabled")]
    ProviderNotFound { provider: String },
    /// An adapter exists but its configuration is missing.
    #[error("Provider config {provider} not found")]
    ConfigNotFound { provider: String },
    /// `response.error` event received in the middle of an event stream.
    #[error("{message}")]
    Stream { message: String },
    /// The vendor answered but no text could be extracted.
    #[error("No response from {api}")]
    EmptyResponse {
        /// Human readable API name, such as `OpenAI API`.
        api: String,
    },
    /// Explicit vendor error payload or an undecodable body.
    #[error("{message}")]
    Provider {
        /// Name of the adapter, such as `openai_chat`.
        provider: &'static str,
        message: String,
    },
    /// Invalid input detected before any request is issued.
    #[error("invalid request: {message}")]
    Validation { message: String },
    /// Fallback that keeps the original message.
    #[error("{message}")]
    Unknown { message: String },
}

impl LLMError {
    /// Creates an [`LLMError::Transport`] from a textual description.
    ///
    /// # Examples
    ///
    /// ```
    /// use ai_relay::error::LLMError;
    ///
    /// let err = LLMError::transport("dns lookup failed");
    /// assert!(matches!(err, LLMError::Transport { .. }));
    /// ```
    pub fn transport<T: Into<String>>(message: T) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Maps a raw transport failure onto the public taxonomy.
    ///
    /// Only [`LLMError::Http`] and [`LLMError::Transport`] are rewritten; every other
    /// variant is returned untouched, so classifying twice yields the same value.
    ///
    /// # Examples
    ///
    /// ```
    /// use ai_relay::error::LLMError;
    ///
    /// let err = LLMError::Http { status: 429, body: "slow down".into() }.classify();
    /// assert!(matches!(err, LLMError::QuotaExceeded));
    /// ```
    pub fn classify(self) -> Self {
        match self {
            LLMError::Http { status, .. } if matches!(status, 401 | 403) => {
                LLMError::Authentication
            }
            LLMError::Http { status: 429, .. } => LLMError::QuotaExceeded,
            raw @ (LLMError::Http { .. } | LLMError::Transport { .. }) => {
                let message = match &raw {
                    LLMError::Transport { message } => message.clone(),
                    other => other.to_string(),
                };
                classify_message(message)
            }
            other => other,
        }
    }
}

fn classify_message(message: String) -> LLMError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        LLMError::Timeout
    } else if lower.contains("fetch") || lower.contains("connection refused") {
        LLMError::Network
    } else {
        LLMError::Unknown { message }
    }
}
