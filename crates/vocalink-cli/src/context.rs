//! Composition root for one CLI invocation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use vocalink_application::App;
use vocalink_infrastructure::{Settings, VocalinkPaths};
use vocalink_interaction::{
    DiscordAuthClient, DiscordSessionFactory, OpenAICompletionClient, VoicevoxEngine,
    build_client,
};

pub struct CliContext {
    pub app: App,
    pub settings: Settings,
}

impl CliContext {
    pub async fn load(paths: &VocalinkPaths) -> Result<Self> {
        let settings = Settings::load(paths).context("Failed to load settings")?;
        let config = &settings.config;

        let client = build_client(config.request_timeout_secs.map(Duration::from_secs))
            .context("Failed to build HTTP client")?;

        let completion = OpenAICompletionClient::from_config(client.clone(), &config.completion)
            .with_model(settings.completion_model());
        let app = App::new(
            Arc::new(completion),
            Arc::new(VoicevoxEngine::from_config(client.clone(), &config.synthesis)),
            Arc::new(DiscordSessionFactory::new(client.clone(), config.discord.clone())),
            Arc::new(DiscordAuthClient::new(client, &config.discord)),
        );

        if let Some(key) = settings.completion_credential() {
            app.initialize_gpt(key).await?;
        }

        Ok(Self { app, settings })
    }

    /// The bot token from `secret.json` or `DISCORD_BOT_TOKEN`.
    pub fn bot_token(&self) -> Result<&str> {
        self.settings.bot_token().context(
            "No bot token configured; set discord.bot_token in secret.json or DISCORD_BOT_TOKEN",
        )
    }
}
