//! Stateless Discord calls: OAuth2 code exchange and one-off guild listing.

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use vocalink_core::config::DiscordEndpoints;
use vocalink_core::platform::{AuthClient, Guild, TokenExchange};
use vocalink_core::{Result, VocalinkError};

use super::rest::DiscordRest;
use crate::http;

const SERVICE: &str = "Discord OAuth";

pub struct DiscordAuthClient {
    client: Client,
    token_url: String,
    rest: DiscordRest,
}

impl DiscordAuthClient {
    pub fn new(client: Client, endpoints: &DiscordEndpoints) -> Self {
        Self {
            rest: DiscordRest::new(client.clone(), endpoints.api_url.clone()),
            token_url: endpoints.oauth_token_url.clone(),
            client,
        }
    }
}

#[async_trait]
impl AuthClient for DiscordAuthClient {
    /// The body is returned for every HTTP status; the caller owns parsing,
    /// including Discord's `{"error": ...}` envelopes.
    async fn exchange_code(
        &self,
        request: &TokenExchange,
        cancel: &CancellationToken,
    ) -> Result<String> {
        if request.code.trim().is_empty() {
            return Err(VocalinkError::config("Authorization code is empty"));
        }

        let form = [
            ("client_id", request.client_id.as_str()),
            ("client_secret", request.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", request.code.as_str()),
            ("redirect_uri", request.redirect_uri.as_str()),
        ];

        let response =
            http::send_unchecked(SERVICE, self.client.post(&self.token_url).form(&form), cancel)
                .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("[OAuth] Token endpoint answered HTTP {}", status.as_u16());
        }

        http::read_text(SERVICE, response, cancel).await
    }

    async fn user_guilds(&self, token: &str, cancel: &CancellationToken) -> Result<Vec<Guild>> {
        if token.trim().is_empty() {
            return Err(VocalinkError::config("Bot token is empty"));
        }
        self.rest.guilds(token, cancel).await
    }
}
