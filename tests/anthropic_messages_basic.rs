mod common;

use ai_relay::LLMProvider;
use ai_relay::provider::anthropic_messages::AnthropicMessagesProvider;
use ai_relay::types::{GenerationRequest, Message};
use common::MockServer;
use serde_json::json;

#[tokio::test]
async fn system_message_is_lifted_and_headers_are_sent() {
    let server = MockServer::json(
        200,
        r#"{"content":[{"type":"text","text":"Salut"}],"usage":{"input_tokens":9,"output_tokens":2}}"#,
    );
    let provider = AnthropicMessagesProvider::new(server.transport.clone(), "sk-ant");

    let request = GenerationRequest::new(vec![
        Message::system("Reply in French."),
        Message::user("Hi"),
    ])
    .with_model("claude-3-5-sonnet-20241022");
    let response = provider.send(request).await.expect("messages call");
    assert_eq!(response.content, "Salut");
    let usage = response.usage.expect("usage");
    assert_eq!(usage.prompt_tokens, Some(9));
    assert_eq!(usage.completion_tokens, Some(2));
    assert_eq!(usage.total_tokens, None);

    let sent = server.last_request();
    assert_eq!(sent.url, "https://api.anthropic.com/v1/messages");
    assert_eq!(
        sent.headers.get("anthropic-version").map(String::as_str),
        Some("2023-06-01")
    );
    assert_eq!(
        sent.headers.get("Authorization").map(String::as_str),
        Some("Bearer sk-ant")
    );
    assert_eq!(
        server.last_body(),
        json!({
            "model": "claude-3-5-sonnet-20241022",
            "system": "Reply in French.",
            "messages": [{"role": "user", "content": "Hi"}],
            "max_tokens": 2000,
            "temperature": 0.7
        })
    );
}

#[tokio::test]
async fn connection_probe_and_static_catalog() {
    let server = MockServer::json(200, r#"{"content":[{"type":"text","text":"."}]}"#);
    let provider = AnthropicMessagesProvider::new(server.transport.clone(), "sk-ant");

    assert!(provider.test_connection().await);
    let body = server.last_body();
    assert_eq!(body["model"], "claude-3-haiku-20240307");
    assert_eq!(body["max_tokens"], 1);

    let models = provider.list_models().await;
    assert_eq!(models.len(), 4);
    assert_eq!(models[0], "claude-3-5-sonnet-20241022");
    assert_eq!(server.seen.lock().expect("lock").len(), 1);
}

#[tokio::test]
async fn rejected_probe_resolves_to_false() {
    let server = MockServer::json(401, r#"{"error":{"message":"invalid x-api-key"}}"#);
    let provider = AnthropicMessagesProvider::new(server.transport.clone(), "bad");
    assert!(!provider.test_connection().await);
}
