//! GeminiClient against a mock HTTP server.

use daily_english::error_code::ErrorKind;
use daily_english::gemini::{ClientOptions, GeminiClient, GenerateRequest, TextGenerator};
use daily_english::secrets::ApiKey;
use daily_english::{DialogueGenerator, Error};
use mockito::{Matcher, Server};
use std::time::Duration;

const PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn client(base_url: &str) -> GeminiClient {
    let options = ClientOptions {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
        proxy_url: None,
    };
    GeminiClient::new(&ApiKey::new("test-key").unwrap(), &options).unwrap()
}

fn request() -> GenerateRequest {
    DialogueGenerator::default().request()
}

#[tokio::test]
async fn sends_key_prompt_and_temperature() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "generationConfig": { "temperature": 0.8 }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"candidates":[{"content":{"parts":[{"text":"🎬 대화:\nA: Hi\nB: Hey"}],"role":"model"},"finishReason":"STOP"}],
               "usageMetadata":{"promptTokenCount":120,"candidatesTokenCount":40,"totalTokenCount":160}}"#,
        )
        .create_async()
        .await;

    let resp = client(&server.url()).generate(&request()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(resp.text, "🎬 대화:\nA: Hi\nB: Hey");
    assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
    assert_eq!(resp.usage.unwrap().total_tokens, 160);
}

#[tokio::test]
async fn prompt_is_sent_verbatim() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_body(Matcher::PartialJson(serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": daily_english::dialogue::PROMPT_TEMPLATE }] }]
        })))
        .with_status(200)
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]}}]}"#)
        .create_async()
        .await;

    client(&server.url()).generate(&request()).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn quota_error_is_classified_and_keeps_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#)
        .create_async()
        .await;

    let err = client(&server.url()).generate(&request()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::QuotaExhausted);
    assert!(err.to_string().contains("quota exceeded"));
}

#[tokio::test]
async fn invalid_key_is_an_authentication_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(400)
        .with_body(
            r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT",
               "details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"API_KEY_INVALID"}]}}"#,
        )
        .create_async()
        .await;

    let err = client(&server.url()).generate(&request()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert!(err.kind().is_credential_problem());
}

#[tokio::test]
async fn empty_candidates_are_malformed() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(r#"{"candidates":[]}"#)
        .create_async()
        .await;

    let err = client(&server.url()).generate(&request()).await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[tokio::test]
async fn non_json_success_body_is_an_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = client(&server.url()).generate(&request()).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Port 9 (discard) on localhost is closed in test environments.
    let err = client("http://127.0.0.1:9")
        .generate(&request())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}
