use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::LLMError;

pub mod bridge;
pub mod reqwest;

/// Enumerates HTTP methods understood by the lightweight transport abstraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Minimal HTTP request representation shared across providers.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

/// Minimal HTTP response representation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Looks up a header ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decodes the body as UTF-8, replacing invalid sequences.
    ///
    /// # Examples
    ///
    /// ```
    /// use ai_relay::http::HttpResponse;
    ///
    /// let response = HttpResponse { status: 200, headers: Default::default(), body: b"ok".to_vec() };
    /// assert_eq!(response.text(), "ok");
    /// ```
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport abstraction used to decouple providers from the concrete HTTP backend.
///
/// Implementations only deliver bytes; status handling lives in [`ApiClient`] so every
/// backend fails the same way.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and resolves once the whole body has been buffered.
    ///
    /// # Errors
    ///
    /// Implementations should map connection failures to [`LLMError::Transport`].
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LLMError>;
}

/// Thread-safe handle to a transport implementation.
pub type DynHttpTransport = Arc<dyn HttpTransport>;

/// Joins a base URL and an endpoint fragment, collapsing exactly one slash on each side
/// of the join point.
///
/// # Examples
///
/// ```
/// use ai_relay::http::join_url;
///
/// assert_eq!(join_url("https://api.openai.com/v1/", "/models"), "https://api.openai.com/v1/models");
/// assert_eq!(join_url("https://api.anthropic.com", "v1/messages"), "https://api.anthropic.com/v1/messages");
/// ```
pub fn join_url(base: &str, endpoint: &str) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
    format!("{base}/{endpoint}")
}

/// Authenticated HTTP client bound to one vendor base URL.
///
/// Headers are merged as `Content-Type: application/json`, then the fixed headers of
/// the client, then the per-call headers; later entries win.
#[derive(Clone)]
pub struct ApiClient {
    transport: DynHttpTransport,
    base_url: String,
    fixed_headers: HashMap<String, String>,
}

impl ApiClient {
    pub fn new(transport: DynHttpTransport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            fixed_headers: HashMap::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Adds a header that is stamped onto every request issued by this client.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fixed_headers.insert(name.into(), value.into());
        self
    }

    /// Issues a request and fails on any non-2xx status.
    ///
    /// The body is serialized to JSON only for non-GET methods.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::Http`] carrying the status and raw body text for non-success
    /// responses, [`LLMError::Validation`] if the body cannot be serialized, or whatever
    /// the transport reports.
    pub async fn request<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&T>,
        headers: HashMap<String, String>,
    ) -> Result<HttpResponse, LLMError> {
        let mut merged =
            HashMap::from([("Content-Type".to_string(), "application/json".to_string())]);
        merge_headers(&mut merged, self.fixed_headers.clone());
        merge_headers(&mut merged, headers);

        let payload = match (method, body) {
            (HttpMethod::Get, _) | (_, None) => None,
            (_, Some(body)) => Some(serde_json::to_vec(body).map_err(|err| {
                LLMError::Validation {
                    message: format!("failed to serialize request: {err}"),
                }
            })?),
        };

        let request = HttpRequest {
            method,
            url: join_url(&self.base_url, endpoint),
            headers: merged,
            body: payload,
        };
        tracing::debug!(url = %request.url, method = ?request.method, "dispatching request");

        let response = self.transport.send(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(LLMError::Http {
                status: response.status,
                body: response.text(),
            })
        }
    }

    /// Convenience wrapper for `POST` with a JSON body.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
        headers: HashMap<String, String>,
    ) -> Result<HttpResponse, LLMError> {
        self.request(endpoint, HttpMethod::Post, Some(body), headers)
            .await
    }

    /// Convenience wrapper for `GET`.
    pub async fn get(
        &self,
        endpoint: &str,
        headers: HashMap<String, String>,
    ) -> Result<HttpResponse, LLMError> {
        self.request::<()>(endpoint, HttpMethod::Get, None, headers)
            .await
    }
}

/// Header names compare ignoring ASCII case; a later entry replaces any earlier spelling.
fn merge_headers(target: &mut HashMap<String, String>, source: HashMap<String, String>) {
    for (name, value) in source {
        target.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        target.insert(name, value);
    }
}

/// Builds the `Authorization: Bearer` header map used by most vendors.
pub(crate) fn bearer_headers(api_key: &str) -> HashMap<String, String> {
    HashMap::from([("Authorization".to_string(), format!("Bearer {api_key}"))])
}
