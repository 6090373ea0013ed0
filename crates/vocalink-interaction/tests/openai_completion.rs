mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use reqwest::Client;
use serde_json::{Value, json};
use vocalink_core::completion::CompletionClient;
use vocalink_core::conversation::ConversationTurn;
use vocalink_core::{CancellationToken, VocalinkError};
use vocalink_interaction::OpenAICompletionClient;

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn client_for(router: Router) -> OpenAICompletionClient {
    let base_url = common::spawn_server(router).await;
    let client = OpenAICompletionClient::new(Client::new())
        .with_url(format!("{base_url}/v1/chat/completions"))
        .with_model("gpt-test");
    client.set_credential("sk-test".to_string()).await;
    client
}

fn replying(reply: Value, captured: Captured) -> Router {
    Router::new()
        .route(
            "/v1/chat/completions",
            post(
                move |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        captured.requests.lock().unwrap().push((auth, body));
                        Json(reply)
                    }
                },
            ),
        )
        .with_state(captured)
}

#[tokio::test]
async fn test_complete_sends_history_with_bearer_credential() {
    let captured = Captured::default();
    let client = client_for(replying(
        json!({"choices": [{"message": {"role": "assistant", "content": "hello"}}]}),
        captured.clone(),
    ))
    .await;

    let history = vec![ConversationTurn::user("hi")];
    let reply = client
        .complete(&history, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(reply.as_deref(), Some("hello"));
    let requests = captured.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0.as_deref(), Some("Bearer sk-test"));
    assert_eq!(
        requests[0].1,
        json!({"model": "gpt-test", "messages": [{"role": "user", "content": "hi"}]})
    );
}

#[tokio::test]
async fn test_empty_choices_is_soft_failure() {
    let client = client_for(replying(json!({"choices": []}), Captured::default())).await;

    let reply = client
        .complete(&[ConversationTurn::user("hi")], &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(reply, None);
}

#[tokio::test]
async fn test_missing_choices_is_protocol_error() {
    let client = client_for(replying(json!({"object": "error"}), Captured::default())).await;

    let err = client
        .complete(&[ConversationTurn::user("hi")], &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_protocol());
}

#[tokio::test]
async fn test_rejected_credential_surfaces_status_and_message() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}})),
            )
                .into_response()
        }),
    );
    let client = client_for(router).await;

    let err = client
        .complete(&[ConversationTurn::user("hi")], &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        VocalinkError::http_status("OpenAI", 401, "Incorrect API key provided")
    );
}

#[tokio::test]
async fn test_cancellation_abandons_stalled_request() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Json(json!({"choices": []}))
        }),
    );
    let client = client_for(router).await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = client
        .complete(&[ConversationTurn::user("hi")], &cancel)
        .await
        .unwrap_err();

    assert_eq!(err, VocalinkError::Cancelled);
}
