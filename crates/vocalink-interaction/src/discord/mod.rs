//! Discord bot session: a gateway connection for presence plus REST reads.

pub mod gateway;
pub mod oauth;
pub mod rest;

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use vocalink_core::config::DiscordEndpoints;
use vocalink_core::platform::{
    BotInfo, Guild, GuildMember, PlatformSession, PlatformUser, SessionFactory,
};
use vocalink_core::{Result, VocalinkError};

use gateway::{DEFAULT_INTENTS, GatewayConnection};
use rest::DiscordRest;

pub use gateway::ReconnectPolicy;
pub use oauth::DiscordAuthClient;

const CDN_URL: &str = "https://cdn.discordapp.com";

/// One bot login. Created unstarted by [`DiscordSessionFactory`].
pub struct DiscordSession {
    token: String,
    gateway_url: String,
    intents: u64,
    reconnect: ReconnectPolicy,
    rest: DiscordRest,
    connection: Option<GatewayConnection>,
}

impl DiscordSession {
    pub fn new(token: impl Into<String>, rest: DiscordRest, gateway_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            gateway_url: gateway_url.into(),
            intents: DEFAULT_INTENTS,
            reconnect: ReconnectPolicy::default(),
            rest,
            connection: None,
        }
    }

    pub fn with_intents(mut self, intents: u64) -> Self {
        self.intents = intents;
        self
    }

    pub fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// The gateway connection, if started and still alive.
    fn live_connection(&self) -> Option<&GatewayConnection> {
        self.connection
            .as_ref()
            .filter(|connection| connection.is_alive())
    }

    /// Resolves once the gateway has given up (or immediately if never started).
    pub async fn disconnected(&self) {
        if let Some(connection) = &self.connection {
            connection.disconnected().await;
        }
    }

    fn require_connected(&self) -> Result<()> {
        if self.live_connection().is_some() {
            Ok(())
        } else {
            Err(VocalinkError::NotConnected)
        }
    }
}

#[async_trait]
impl PlatformSession for DiscordSession {
    async fn start(&mut self, cancel: &CancellationToken) -> Result<()> {
        if self.live_connection().is_some() {
            return Ok(());
        }

        let connection = GatewayConnection::connect(
            &self.gateway_url,
            &self.token,
            self.intents,
            self.reconnect,
            cancel,
        )
        .await?;
        self.connection = Some(connection);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        match self.connection.take() {
            Some(mut connection) => connection.shutdown().await,
            None => Ok(()),
        }
    }

    fn is_connected(&self) -> bool {
        self.live_connection().is_some()
    }

    fn bot_info(&self) -> Option<BotInfo> {
        self.live_connection()
            .map(|connection| bot_info_for(connection.user()))
    }

    async fn guilds(&self, cancel: &CancellationToken) -> Result<Vec<Guild>> {
        self.require_connected()?;
        self.rest.guilds(&self.token, cancel).await
    }

    async fn guild_members(
        &self,
        guild_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<GuildMember>> {
        self.require_connected()?;
        self.rest.guild_members(&self.token, guild_id, cancel).await
    }
}

/// Avatar URL for a user, falling back to Discord's default avatar.
pub fn bot_info_for(user: &PlatformUser) -> BotInfo {
    let avatar_url = match &user.avatar {
        Some(hash) => format!("{CDN_URL}/avatars/{}/{hash}.png", user.id),
        None => {
            // New-style usernames index default avatars by (id >> 22) % 6.
            let index = user.id.parse::<u64>().map(|id| (id >> 22) % 6).unwrap_or(0);
            format!("{CDN_URL}/embed/avatars/{index}.png")
        }
    };

    BotInfo {
        username: user.username.clone(),
        avatar_url,
    }
}

/// Builds [`DiscordSession`]s sharing one HTTP client and endpoint set.
pub struct DiscordSessionFactory {
    client: Client,
    endpoints: DiscordEndpoints,
    reconnect: ReconnectPolicy,
}

impl DiscordSessionFactory {
    pub fn new(client: Client, endpoints: DiscordEndpoints) -> Self {
        Self {
            client,
            endpoints,
            reconnect: ReconnectPolicy::default(),
        }
    }

    pub fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }
}

impl SessionFactory for DiscordSessionFactory {
    fn create(&self, token: &str) -> Result<Box<dyn PlatformSession>> {
        if rest::bare_token(token).is_empty() {
            return Err(VocalinkError::config("Bot token is empty"));
        }

        let rest = DiscordRest::new(self.client.clone(), self.endpoints.api_url.clone());
        Ok(Box::new(
            DiscordSession::new(token, rest, self.endpoints.gateway_url.clone())
                .with_reconnect_policy(self.reconnect),
        ))
    }
}
