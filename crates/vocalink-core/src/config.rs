//! Configuration model: `config.toml` for endpoints and `secret.json` for credentials.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SYNTHESIS_URL: &str = "http://localhost:50021";
pub const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";
pub const DEFAULT_DISCORD_OAUTH_URL: &str = "https://discordapp.com/api/oauth2/token";
pub const DEFAULT_DISCORD_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// Non-secret application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Per-request HTTP timeout in seconds. `None` keeps the transport default.
    pub request_timeout_secs: Option<u64>,
    pub synthesis: SynthesisConfig,
    pub completion: CompletionConfig,
    pub discord: DiscordEndpoints,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: None,
            synthesis: SynthesisConfig::default(),
            completion: CompletionConfig::default(),
            discord: DiscordEndpoints::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub base_url: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SYNTHESIS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub url: String,
    pub model: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_COMPLETION_URL.to_string(),
            model: DEFAULT_COMPLETION_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordEndpoints {
    pub api_url: String,
    pub oauth_token_url: String,
    pub gateway_url: String,
}

impl Default for DiscordEndpoints {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_DISCORD_API_URL.to_string(),
            oauth_token_url: DEFAULT_DISCORD_OAUTH_URL.to_string(),
            gateway_url: DEFAULT_DISCORD_GATEWAY_URL.to_string(),
        }
    }
}

/// Credentials read from `secret.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub openai: Option<OpenAIConfig>,
    #[serde(default)]
    pub discord: Option<DiscordSecrets>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordSecrets {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
}
