//! Shared reqwest plumbing: client construction, cancellable sends and
//! status checking.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use vocalink_core::cancel::run_cancellable;
use vocalink_core::{Result, VocalinkError};

/// Builds a client, applying `timeout` when one is configured.
pub fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|err| VocalinkError::config(format!("Failed to build HTTP client: {err}")))
}

/// Sends `request` and fails with [`VocalinkError::HttpStatus`] (status code
/// plus body) when the response is not a success.
pub(crate) async fn send(
    service: &str,
    request: RequestBuilder,
    cancel: &CancellationToken,
) -> Result<Response> {
    let response = send_unchecked(service, request, cancel).await?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = read_text(service, response, cancel)
        .await
        .unwrap_or_else(|_| "<unreadable response body>".to_string());
    Err(VocalinkError::http_status(service, status.as_u16(), body))
}

/// Sends `request` without looking at the status code.
pub(crate) async fn send_unchecked(
    service: &str,
    request: RequestBuilder,
    cancel: &CancellationToken,
) -> Result<Response> {
    run_cancellable(cancel, async {
        request
            .send()
            .await
            .map_err(|err| VocalinkError::transport(service, err))
    })
    .await
}

pub(crate) async fn read_bytes(
    service: &str,
    response: Response,
    cancel: &CancellationToken,
) -> Result<Vec<u8>> {
    run_cancellable(cancel, async {
        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|err| VocalinkError::transport(service, err))
    })
    .await
}

pub(crate) async fn read_text(
    service: &str,
    response: Response,
    cancel: &CancellationToken,
) -> Result<String> {
    run_cancellable(cancel, async {
        response
            .text()
            .await
            .map_err(|err| VocalinkError::transport(service, err))
    })
    .await
}

/// Reads the body and decodes it as JSON; a body that does not match `T` is a
/// protocol error.
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &str,
    response: Response,
    cancel: &CancellationToken,
) -> Result<T> {
    let body = read_text(service, response, cancel).await?;
    serde_json::from_str(&body).map_err(|err| {
        VocalinkError::protocol(format!("Failed to parse {service} response: {err}"))
    })
}
