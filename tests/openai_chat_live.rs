use std::env;

use ai_relay::LLMProvider;
use ai_relay::http::reqwest::default_dyn_transport;
use ai_relay::provider::openai_chat::OpenAiChatProvider;
use ai_relay::types::{GenerationRequest, Message};
use dotenvy::dotenv;

fn load_env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[tokio::test]
#[ignore = "requires valid OpenAI-compatible endpoint"]
async fn openai_chat_live_send() {
    let _ = dotenv();

    let Some(endpoint) = load_env_var("OPENAI_CHAT_ENDPOINT") else {
        eprintln!("skip live test: OPENAI_CHAT_ENDPOINT missing");
        return;
    };
    let Some(api_key) = load_env_var("OPENAI_CHAT_KEY") else {
        eprintln!("skip live test: OPENAI_CHAT_KEY missing");
        return;
    };
    let Some(model) = load_env_var("OPENAI_CHAT_MODEL") else {
        eprintln!("skip live test: OPENAI_CHAT_MODEL missing");
        return;
    };

    let transport = default_dyn_transport().expect("transport");
    let provider = OpenAiChatProvider::new(transport, api_key).with_base_url(endpoint);

    let request = GenerationRequest::new(vec![
        Message::system("You are a helpful assistant."),
        Message::user("Please introduce Rust language in one sentence."),
    ])
    .with_model(model);
    let response = provider.send(request).await.expect("chat request should succeed");
    assert!(!response.content.trim().is_empty(), "response should contain text");
    assert!(provider.test_connection().await, "models endpoint should answer");
}
