#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use ai_relay::http::bridge::{BridgeResponse, BridgeTransport};
use ai_relay::http::{DynHttpTransport, HttpRequest};

/// 记录请求并返回固定响应的传输层
pub struct MockServer {
    pub seen: Arc<Mutex<Vec<HttpRequest>>>,
    pub transport: DynHttpTransport,
}

impl MockServer {
    pub fn respond(response: BridgeResponse) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let transport = BridgeTransport::from_fn(move |request: HttpRequest| {
            sink.lock().expect("lock").push(request);
            let response = response.clone();
            async move { Ok(response) }
        });
        Self {
            seen,
            transport: Arc::new(transport),
        }
    }

    pub fn json(status: u16, body: &str) -> Self {
        Self::respond(BridgeResponse::text(status, body).with_header("Content-Type", "application/json"))
    }

    pub fn last_request(&self) -> HttpRequest {
        self.seen
            .lock()
            .expect("lock")
            .last()
            .cloned()
            .expect("at least one request")
    }

    pub fn last_body(&self) -> serde_json::Value {
        let request = self.last_request();
        serde_json::from_slice(request.body.as_deref().expect("request body")).expect("json body")
    }
}
