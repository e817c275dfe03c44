//! Transport backed by an HTTP bridge embedded in the host application.
//!
//! Hosts that cannot let the library open sockets (sandboxed editors, webviews) hand
//! requests to their own HTTP facility. The bridge may answer with decoded text or raw
//! bytes; both are normalized into one [`HttpResponse`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_core::future::BoxFuture;
use futures_util::FutureExt;

use crate::error::LLMError;

use super::{HttpRequest, HttpResponse, HttpTransport};

/// Response shape produced by a host bridge.
#[derive(Debug, Clone, Default)]
pub struct BridgeResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    /// Decoded body, preferred when present.
    pub text: Option<String>,
    /// Raw body used when the host did not decode it.
    pub bytes: Option<Vec<u8>>,
}

impl BridgeResponse {
    /// Text response with the given status.
    pub fn text(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    fn into_http_response(self) -> HttpResponse {
        let body = match (self.text, self.bytes) {
            (Some(text), _) => text.into_bytes(),
            (None, Some(bytes)) => bytes,
            (None, None) => Vec::new(),
        };
        HttpResponse {
            status: self.status,
            headers: self.headers,
            body,
        }
    }
}

/// Host-provided request function.
pub trait HostBridge: Send + Sync {
    fn request(&self, request: HttpRequest) -> BoxFuture<'static, Result<BridgeResponse, LLMError>>;
}

struct FnBridge<F>(F);

impl<F, Fut> HostBridge for FnBridge<F>
where
    F: Fn(HttpRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<BridgeResponse, LLMError>> + Send + 'static,
{
    fn request(&self, request: HttpRequest) -> BoxFuture<'static, Result<BridgeResponse, LLMError>> {
        (self.0)(request).boxed()
    }
}

/// [`HttpTransport`] that delegates to a [`HostBridge`].
#[derive(Clone)]
pub struct BridgeTransport {
    bridge: Arc<dyn HostBridge>,
}

impl BridgeTransport {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }

    /// Wraps an async closure as a bridge.
    ///
    /// # Examples
    ///
    /// ```
    /// use ai_relay::http::bridge::{BridgeResponse, BridgeTransport};
    /// use ai_relay::http::{HttpMethod, HttpRequest, HttpTransport};
    ///
    /// let transport = BridgeTransport::from_fn(|_request| async {
    ///     Ok(BridgeResponse::text(200, "pong"))
    /// });
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let response = transport
    ///     .send(HttpRequest {
    ///         method: HttpMethod::Get,
    ///         url: "https://example.com/ping".into(),
    ///         headers: Default::default(),
    ///         body: None,
    ///     })
    ///     .await
    ///     .unwrap();
    /// assert_eq!(response.text(), "pong");
    /// # });
    /// ```
    pub fn from_fn<F, Fut>(handler: F) -> Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<BridgeResponse, LLMError>> + Send + 'static,
    {
        Self::new(Arc::new(FnBridge(handler)))
    }
}

#[async_trait]
impl HttpTransport for BridgeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LLMError> {
        let response = self.bridge.request(request).await?;
        Ok(response.into_http_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: HashMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn binary_body_is_used_when_text_is_absent() {
        let transport = BridgeTransport::from_fn(|_| async {
            Ok(BridgeResponse {
                status: 200,
                headers: HashMap::new(),
                text: None,
                bytes: Some(b"raw".to_vec()),
            })
        });
        let response = transport.send(get("https://x")).await.expect("send");
        assert_eq!(response.body, b"raw".to_vec());
    }

    #[tokio::test]
    async fn text_body_wins_over_bytes() {
        let transport = BridgeTransport::from_fn(|_| async {
            Ok(BridgeResponse {
                status: 201,
                headers: HashMap::new(),
                text: Some("text".to_string()),
                bytes: Some(b"raw".to_vec()),
            })
        });
        let response = transport.send(get("https://x")).await.expect("send");
        assert_eq!(response.status, 201);
        assert_eq!(response.text(), "text");
    }

    #[tokio::test]
    async fn bridge_errors_propagate() {
        let transport =
            BridgeTransport::from_fn(|_| async { Err(LLMError::transport("fetch failed")) });
        let err = transport.send(get("https://x")).await.expect_err("error");
        assert!(matches!(err, LLMError::Transport { .. }));
    }
}
