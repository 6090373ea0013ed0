//! Effective settings: files on disk plus environment overrides.

use vocalink_core::Result;
use vocalink_core::config::{AppConfig, DiscordSecrets, OpenAIConfig, SecretConfig};

use crate::paths::VocalinkPaths;
use crate::storage::{ConfigStorage, SecretStorage};

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_MODEL_NAME: &str = "OPENAI_MODEL_NAME";
pub const ENV_DISCORD_BOT_TOKEN: &str = "DISCORD_BOT_TOKEN";
pub const ENV_SYNTHESIS_URL: &str = "VOCALINK_SYNTHESIS_URL";

/// Configuration and secrets as the composition root sees them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub config: AppConfig,
    pub secrets: SecretConfig,
}

impl Settings {
    /// Loads `config.toml` and `secret.json` and applies the process environment.
    pub fn load(paths: &VocalinkPaths) -> Result<Self> {
        Self::load_with_env(paths, |key| std::env::var(key).ok())
    }

    pub fn load_with_env<F>(paths: &VocalinkPaths, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ConfigStorage::new(paths.config_file()?).load()?;
        let secrets = SecretStorage::with_path(paths.secret_file()?).load()?;
        let mut settings = Self { config, secrets };
        settings.apply_env(env);
        Ok(settings)
    }

    /// Overrides file values with non-empty environment variables.
    pub fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        if let Some(api_key) = lookup(ENV_OPENAI_API_KEY) {
            tracing::debug!("Using {} from environment", ENV_OPENAI_API_KEY);
            match &mut self.secrets.openai {
                Some(openai) => openai.api_key = api_key,
                None => {
                    self.secrets.openai = Some(OpenAIConfig {
                        api_key,
                        model_name: None,
                    })
                }
            }
        }
        if let Some(model) = lookup(ENV_OPENAI_MODEL_NAME) {
            if let Some(openai) = &mut self.secrets.openai {
                openai.model_name = Some(model.clone());
            }
            self.config.completion.model = model;
        }
        if let Some(token) = lookup(ENV_DISCORD_BOT_TOKEN) {
            tracing::debug!("Using {} from environment", ENV_DISCORD_BOT_TOKEN);
            self.secrets
                .discord
                .get_or_insert_with(DiscordSecrets::default)
                .bot_token = Some(token);
        }
        if let Some(url) = lookup(ENV_SYNTHESIS_URL) {
            self.config.synthesis.base_url = url;
        }
    }

    /// The completion API key, if one is configured and non-empty.
    pub fn completion_credential(&self) -> Option<&str> {
        self.secrets
            .openai
            .as_ref()
            .map(|openai| openai.api_key.as_str())
            .filter(|key| !key.trim().is_empty())
    }

    /// The model name from `secret.json`, falling back to `config.toml`.
    pub fn completion_model(&self) -> &str {
        self.secrets
            .openai
            .as_ref()
            .and_then(|openai| openai.model_name.as_deref())
            .filter(|model| !model.trim().is_empty())
            .unwrap_or(self.config.completion.model.as_str())
    }

    pub fn bot_token(&self) -> Option<&str> {
        self.secrets
            .discord
            .as_ref()
            .and_then(|discord| discord.bot_token.as_deref())
            .filter(|token| !token.trim().is_empty())
    }
}
