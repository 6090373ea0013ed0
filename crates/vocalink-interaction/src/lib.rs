//! Adapters for the external services Vocalink talks to: the OpenAI chat
//! completion API, a local VOICEVOX engine, and Discord (gateway, REST and
//! OAuth).

pub mod discord;
pub mod http;
pub mod openai_completion;
pub mod voicevox_engine;

pub use discord::{DiscordAuthClient, DiscordSession, DiscordSessionFactory, ReconnectPolicy};
pub use http::build_client;
pub use openai_completion::OpenAICompletionClient;
pub use voicevox_engine::VoicevoxEngine;
