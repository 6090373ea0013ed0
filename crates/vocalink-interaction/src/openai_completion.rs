//! OpenAICompletionClient - Direct REST client for the OpenAI Chat Completions API.
//!
//! The bearer credential is supplied at runtime through
//! [`CompletionClient::set_credential`] and kept for the lifetime of the client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use vocalink_core::completion::CompletionClient;
use vocalink_core::config::{CompletionConfig, DEFAULT_COMPLETION_MODEL, DEFAULT_COMPLETION_URL};
use vocalink_core::conversation::ConversationTurn;
use vocalink_core::{Result, VocalinkError};

use crate::http;

const SERVICE: &str = "OpenAI";

/// Completion client that talks to the OpenAI HTTP API.
pub struct OpenAICompletionClient {
    client: Client,
    url: String,
    model: String,
    credential: RwLock<Option<String>>,
}

impl OpenAICompletionClient {
    /// Creates a client for the public endpoint and default model.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: DEFAULT_COMPLETION_URL.to_string(),
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            credential: RwLock::new(None),
        }
    }

    pub fn from_config(client: Client, config: &CompletionConfig) -> Self {
        Self::new(client)
            .with_url(config.url.clone())
            .with_model(config.model.clone())
    }

    /// Overrides the endpoint URL (used to point at compatible servers).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for OpenAICompletionClient {
    async fn set_credential(&self, credential: String) {
        *self.credential.write().await = Some(credential);
    }

    async fn has_credential(&self) -> bool {
        self.credential.read().await.is_some()
    }

    async fn complete(
        &self,
        history: &[ConversationTurn],
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let credential = self
            .credential
            .read()
            .await
            .clone()
            .ok_or_else(|| VocalinkError::MissingCredential("OpenAI API key".to_string()))?;

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: history,
        };

        tracing::debug!(
            "[OpenAI] Sending {} turn(s) to model {}",
            history.len(),
            self.model
        );

        let request = self
            .client
            .post(&self.url)
            .bearer_auth(credential)
            .json(&body);

        let response = match http::send(SERVICE, request, cancel).await {
            Err(VocalinkError::HttpStatus { status, body, .. }) => {
                return Err(map_http_error(status, body));
            }
            other => other?,
        };

        let parsed: ChatCompletionResponse = http::read_json(SERVICE, response, cancel).await?;
        Ok(extract_text_response(parsed))
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ConversationTurn],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
}

/// Keeps the status and replaces an OpenAI error envelope with its message.
fn map_http_error(status: u16, body: String) -> VocalinkError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    if status == StatusCode::UNAUTHORIZED.as_u16() {
        tracing::warn!("[OpenAI] Credential rejected: {}", message);
    }

    VocalinkError::http_status(SERVICE, status, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let history = vec![
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("hello"),
        ];
        let body = ChatCompletionRequest {
            model: "gpt-4-turbo",
            messages: &history,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-4-turbo",
                "messages": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"}
                ]
            })
        );
    }

    #[test]
    fn test_extract_first_choice() {
        let parsed: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "first"}},
                            {"message": {"role": "assistant", "content": "second"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(parsed), Some("first".to_string()));
    }

    #[test]
    fn test_empty_choices_is_none() {
        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(extract_text_response(parsed), None);
    }

    #[test]
    fn test_map_http_error_unwraps_envelope() {
        let err = map_http_error(
            401,
            r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#
                .to_string(),
        );
        assert_eq!(
            err,
            VocalinkError::http_status(SERVICE, 401, "Incorrect API key provided")
        );
    }

    #[test]
    fn test_map_http_error_keeps_raw_body() {
        let err = map_http_error(502, "bad gateway".to_string());
        assert_eq!(err, VocalinkError::http_status(SERVICE, 502, "bad gateway"));
    }

    #[tokio::test]
    async fn test_complete_without_credential_fails_before_sending() {
        let client = OpenAICompletionClient::new(Client::new()).with_url("http://127.0.0.1:9/unused");
        assert!(!client.has_credential().await);

        let err = client
            .complete(&[ConversationTurn::user("hi")], &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, VocalinkError::MissingCredential(_)));
    }
}
