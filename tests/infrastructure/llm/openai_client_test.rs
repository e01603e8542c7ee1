use std::time::Duration;

use orator::application::ports::{LlmClient, LlmClientError};
use orator::infrastructure::llm::OpenAiClient;

use crate::helpers::start_recording_server;

fn client(base_url: &str) -> OpenAiClient {
    OpenAiClient::new(
        base_url,
        "sk-test".to_string(),
        "gpt-4o-mini".to_string(),
        400,
        0.2,
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn given_completion_when_calling_then_returns_first_choice_content() {
    let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"scores\":{}}"}}]}"#;
    let (base_url, shutdown_tx, captured) = start_recording_server(200, body, vec![]).await;

    let content = client(&base_url)
        .complete("system prompt", "user prompt")
        .await
        .unwrap();

    assert_eq!(content, r#"{"scores":{}}"#);

    let requests = captured.lock().unwrap().clone();
    assert_eq!(requests[0].path, "/chat/completions");
    assert_eq!(
        requests[0].headers.get("authorization").unwrap(),
        "Bearer sk-test"
    );
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["model"], "gpt-4o-mini");
    assert_eq!(sent["max_tokens"], 400);
    assert_eq!(sent["messages"][0]["role"], "system");
    assert_eq!(sent["messages"][1]["content"], "user prompt");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_rate_limit_when_calling_then_returns_rate_limited() {
    let (base_url, shutdown_tx, _) = start_recording_server(429, "{}", vec![]).await;

    let result = client(&base_url).complete("s", "p").await;

    assert!(matches!(result, Err(LlmClientError::RateLimited)));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_server_error_when_calling_then_returns_request_failure_with_status() {
    let (base_url, shutdown_tx, _) =
        start_recording_server(500, r#"{"error":"overloaded"}"#, vec![]).await;

    let result = client(&base_url).complete("s", "p").await;

    match result {
        Err(LlmClientError::ApiRequestFailed(message)) => assert!(message.contains("500")),
        other => panic!("expected request failure, got {other:?}"),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_empty_choices_when_calling_then_returns_invalid_response() {
    let (base_url, shutdown_tx, _) =
        start_recording_server(200, r#"{"choices":[]}"#, vec![]).await;

    let result = client(&base_url).complete("s", "p").await;

    assert!(matches!(result, Err(LlmClientError::InvalidResponse(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_null_content_when_calling_then_returns_invalid_response() {
    let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
    let (base_url, shutdown_tx, _) = start_recording_server(200, body, vec![]).await;

    let result = client(&base_url).complete("s", "p").await;

    assert!(matches!(result, Err(LlmClientError::InvalidResponse(_))));
    shutdown_tx.send(()).ok();
}
