use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::sync::CancellationToken;
use vocalink_application::{App, AppEvent};
use vocalink_infrastructure::{Settings, VocalinkPaths};
use vocalink_interaction::{
    DiscordAuthClient, DiscordSessionFactory, OpenAICompletionClient, VoicevoxEngine,
    build_client,
};

use crate::app::AppState;
use crate::app::requests::RequestRegistry;

pub struct AppBootstrap {
    pub app_state: AppState,
    pub events: UnboundedReceiver<AppEvent>,
}

/// Composition root: wires the adapters into [`App`] from the on-disk settings.
///
/// The completion credential is initialized when `secret.json` (or the
/// environment) carries one. The bot is only connected when the frontend asks.
pub async fn bootstrap(paths: &VocalinkPaths) -> Result<AppBootstrap> {
    if let Err(e) = paths.ensure_secret_file() {
        tracing::warn!("[Bootstrap] Could not create secret template: {}", e);
    }

    let settings = Settings::load(paths).context("Failed to load settings")?;
    let config = &settings.config;

    let client = build_client(config.request_timeout_secs.map(Duration::from_secs))
        .context("Failed to build HTTP client")?;

    let completion = OpenAICompletionClient::from_config(client.clone(), &config.completion)
        .with_model(settings.completion_model());
    tracing::info!(
        "[Bootstrap] Completion model {}, synthesis engine at {}",
        completion.model(),
        config.synthesis.base_url
    );

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let app = App::new(
        Arc::new(completion),
        Arc::new(VoicevoxEngine::from_config(client.clone(), &config.synthesis)),
        Arc::new(DiscordSessionFactory::new(client.clone(), config.discord.clone())),
        Arc::new(DiscordAuthClient::new(client, &config.discord)),
    )
    .with_event_sender(event_tx);

    match settings.completion_credential() {
        Some(key) => app.initialize_gpt(key).await?,
        None => tracing::info!("[Bootstrap] No OpenAI API key configured yet"),
    }

    Ok(AppBootstrap {
        app_state: AppState {
            app: Arc::new(app),
            settings,
            requests: RequestRegistry::new(CancellationToken::new()),
        },
        events: event_rx,
    })
}
