mod common;

use ai_relay::client::ProviderRegistry;
use ai_relay::config::{ApiType, builtin_providers};
use ai_relay::error::LLMError;
use ai_relay::http::bridge::BridgeResponse;
use ai_relay::types::{GenerationRequest, Message};
use common::MockServer;

#[tokio::test]
async fn openrouter_requests_carry_vendor_headers() {
    let server = MockServer::json(200, r#"{"choices":[{"message":{"content":"routed"}}]}"#);
    let registry = ProviderRegistry::new(server.transport.clone());
    let configs = builtin_providers()
        .into_iter()
        .map(|config| {
            if config.id == "openrouter" {
                config.with_api_key("or-key")
            } else {
                config
            }
        })
        .collect();
    registry.replace_all(configs);
    assert_eq!(registry.pick_automatic().as_deref(), Some("openrouter"));

    let response = registry
        .send("openrouter", &GenerationRequest::new(vec![Message::user("Hi")]))
        .await
        .expect("routed call");
    assert_eq!(response.content, "routed");

    let sent = server.last_request();
    assert_eq!(sent.url, "https://openrouter.ai/api/v1/chat/completions");
    assert_eq!(
        sent.headers.get("HTTP-Referer").map(String::as_str),
        Some("https://github.com/yourusername/obsidian-at-ai")
    );
    assert_eq!(
        sent.headers.get("X-Title").map(String::as_str),
        Some("@AI Obsidian Plugin")
    );
    assert_eq!(server.last_body()["model"], "anthropic/claude-3.5-sonnet");
}

#[tokio::test]
async fn openai_with_responses_api_type_routes_to_responses_endpoint() {
    let server = MockServer::respond(BridgeResponse::text(
        200,
        "data: {\"type\":\"response.output_text.delta\",\"delta\":\"streamed\"}\n\ndata: [DONE]\n\n",
    ));
    let registry = ProviderRegistry::new(server.transport.clone());
    let mut openai = builtin_providers().remove(0).with_api_key("sk-test");
    openai.api_type = Some(ApiType::Responses);
    registry.replace_all(vec![openai]);

    let response = registry
        .send("openai", &GenerationRequest::new(vec![Message::user("Hi")]))
        .await
        .expect("responses call");
    assert_eq!(response.content, "streamed");
    assert_eq!(server.last_request().url, "https://api.openai.com/v1/responses");
    assert_eq!(server.last_body()["model"], "gpt-4o-mini");
}

#[tokio::test]
async fn adapter_errors_pass_through_the_registry() {
    let server = MockServer::json(429, r#"{"error":"slow down"}"#);
    let registry = ProviderRegistry::new(server.transport.clone());
    registry.replace_all(vec![builtin_providers().remove(5).with_api_key("glm-key")]);

    let err = registry
        .send("glm", &GenerationRequest::new(vec![Message::user("Hi")]))
        .await
        .expect_err("quota");
    assert!(matches!(err, LLMError::QuotaExceeded));

    let err = registry
        .send("kimi", &GenerationRequest::new(vec![Message::user("Hi")]))
        .await
        .expect_err("not registered");
    assert_eq!(err.to_string(), "Provider kimi not found or not enabled");
}
