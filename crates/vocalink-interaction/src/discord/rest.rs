//! Read-only Discord REST calls authenticated with a bot token.

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use vocalink_core::platform::{Guild, GuildMember};
use vocalink_core::{Result, VocalinkError};

use crate::http;

const SERVICE: &str = "Discord";

/// Discord caps `GET /users/@me/guilds` at 200; 100 matches the desktop UI page.
const GUILD_PAGE_LIMIT: u32 = 100;
const MEMBER_PAGE_LIMIT: u32 = 1000;

#[derive(Clone)]
pub struct DiscordRest {
    client: Client,
    api_url: String,
}

impl DiscordRest {
    pub fn new(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn guilds(&self, token: &str, cancel: &CancellationToken) -> Result<Vec<Guild>> {
        self.get(
            &format!("users/@me/guilds?limit={GUILD_PAGE_LIMIT}"),
            token,
            cancel,
        )
        .await
    }

    pub async fn guild_members(
        &self,
        token: &str,
        guild_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<GuildMember>> {
        let guild_id = guild_id.trim();
        if guild_id.is_empty() || !guild_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(VocalinkError::config(format!(
                "Invalid guild id: '{guild_id}'"
            )));
        }

        self.get(
            &format!("guilds/{guild_id}/members?limit={MEMBER_PAGE_LIMIT}"),
            token,
            cancel,
        )
        .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let request = self
            .client
            .get(format!("{}/{}", self.api_url, path))
            .header(AUTHORIZATION, bot_authorization(token));

        let response = http::send(SERVICE, request, cancel).await?;
        http::read_json(SERVICE, response, cancel).await
    }
}

/// Formats the `Authorization` header value, accepting tokens with or
/// without the `Bot ` prefix.
pub fn bot_authorization(token: &str) -> String {
    let token = token.trim();
    if token.starts_with("Bot ") {
        token.to_string()
    } else {
        format!("Bot {token}")
    }
}

/// Strips an optional `Bot ` prefix, as the gateway expects the bare token.
pub fn bare_token(token: &str) -> &str {
    let token = token.trim();
    token.strip_prefix("Bot ").unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_authorization_adds_prefix_once() {
        assert_eq!(bot_authorization("abc"), "Bot abc");
        assert_eq!(bot_authorization("Bot abc"), "Bot abc");
        assert_eq!(bare_token("Bot abc"), "abc");
        assert_eq!(bare_token(" abc "), "abc");
    }

    #[tokio::test]
    async fn test_invalid_guild_id_rejected_locally() {
        let rest = DiscordRest::new(Client::new(), "http://127.0.0.1:9");
        let err = rest
            .guild_members("token", "../admin", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_config());
    }
}
