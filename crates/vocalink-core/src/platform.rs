//! Messaging platform (Discord) domain types and session seams.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// A guild visible to the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub owner: bool,
    #[serde(default)]
    pub permissions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildMember {
    pub user: PlatformUser,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub joined_at: Option<String>,
}

/// Identity of the connected bot, shown by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotInfo {
    pub username: String,
    #[serde(rename = "avatarURL")]
    pub avatar_url: String,
}

/// One live connection to the messaging platform.
///
/// Implementations must make [`close`](Self::close) idempotent and safe to
/// call on a session whose [`start`](Self::start) never completed.
#[async_trait]
pub trait PlatformSession: Send + Sync {
    /// Opens the connection.
    async fn start(&mut self, cancel: &CancellationToken) -> Result<()>;

    /// Closes the connection.
    async fn close(&mut self) -> Result<()>;

    /// True while started and still online. A session that lost its
    /// connection and could not recover reports false.
    fn is_connected(&self) -> bool;

    /// `None` unless connected.
    fn bot_info(&self) -> Option<BotInfo>;

    async fn guilds(&self, cancel: &CancellationToken) -> Result<Vec<Guild>>;

    async fn guild_members(
        &self,
        guild_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<GuildMember>>;
}

/// Builds unstarted sessions from a bot token.
pub trait SessionFactory: Send + Sync {
    fn create(&self, token: &str) -> Result<Box<dyn PlatformSession>>;
}

/// Parameters of an OAuth2 authorization-code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchange {
    pub client_id: String,
    pub client_secret: String,
    pub code: String,
    pub redirect_uri: String,
}

/// Stateless platform calls that never touch the managed session.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Exchanges an authorization code; returns the raw response body.
    async fn exchange_code(
        &self,
        request: &TokenExchange,
        cancel: &CancellationToken,
    ) -> Result<String>;

    /// Lists guilds for a bot token without opening a session.
    async fn user_guilds(&self, token: &str, cancel: &CancellationToken) -> Result<Vec<Guild>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_info_serializes_for_frontend() {
        let info = BotInfo {
            username: "vocalink".into(),
            avatar_url: "https://cdn.example/a.png".into(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["username"], "vocalink");
        assert_eq!(json["avatarURL"], "https://cdn.example/a.png");
    }

    #[test]
    fn test_guild_member_tolerates_sparse_payload() {
        let member: GuildMember =
            serde_json::from_str(r#"{"user": {"id": "1", "username": "alice"}}"#).unwrap();
        assert_eq!(member.user.username, "alice");
        assert!(member.roles.is_empty());
        assert!(!member.user.bot);
    }
}
