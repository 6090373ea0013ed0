//! The orchestrator invoked by the presentation layer.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use vocalink_core::cancel::run_cancellable;
use vocalink_core::completion::{CompletionClient, NO_RESPONSE_REPLY};
use vocalink_core::conversation::{ConversationHistory, ConversationTurn};
use vocalink_core::platform::{
    AuthClient, BotInfo, Guild, GuildMember, SessionFactory, TokenExchange,
};
use vocalink_core::synthesis::{Speaker, SynthesisEngine};
use vocalink_core::{Result, VocalinkError};

use crate::events::AppEvent;
use crate::session_manager::SessionManager;
use crate::synthesis_pipeline::SynthesisPipeline;

/// State guarded by the orchestrator mutex.
struct SharedState {
    history: ConversationHistory,
    sessions: SessionManager,
}

/// Application context composed once at startup and shared by every caller.
///
/// Conversation history and the bot session sit behind one mutex; synthesis
/// and the stateless Discord calls run outside it.
pub struct App {
    state: Mutex<SharedState>,
    completion: Arc<dyn CompletionClient>,
    synthesis: SynthesisPipeline,
    auth: Arc<dyn AuthClient>,
    event_sender: Option<UnboundedSender<AppEvent>>,
}

impl App {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        engine: Arc<dyn SynthesisEngine>,
        session_factory: Arc<dyn SessionFactory>,
        auth: Arc<dyn AuthClient>,
    ) -> Self {
        Self {
            state: Mutex::new(SharedState {
                history: ConversationHistory::new(),
                sessions: SessionManager::new(session_factory),
            }),
            completion,
            synthesis: SynthesisPipeline::new(engine),
            auth,
            event_sender: None,
        }
    }

    /// Routes [`AppEvent`]s to the presentation layer.
    pub fn with_event_sender(mut self, sender: UnboundedSender<AppEvent>) -> Self {
        self.event_sender = Some(sender);
        self
    }

    // ============================================================================
    // Bot session
    // ============================================================================

    /// Connects the bot, closing any previous session first.
    pub async fn initialize_bot(&self, token: &str, cancel: &CancellationToken) -> Result<()> {
        let mut state = self.state.lock().await;
        state.sessions.initialize(token, cancel).await
    }

    pub async fn is_bot_connected(&self) -> bool {
        self.state.lock().await.sessions.is_connected()
    }

    pub async fn bot_info(&self) -> Result<BotInfo> {
        self.state.lock().await.sessions.bot_info()
    }

    pub async fn guilds(&self, cancel: &CancellationToken) -> Result<Vec<Guild>> {
        let state = self.state.lock().await;
        state.sessions.guilds(cancel).await
    }

    pub async fn guild_members(
        &self,
        guild_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<GuildMember>> {
        let state = self.state.lock().await;
        state.sessions.guild_members(guild_id, cancel).await
    }

    /// Closes the bot session. Called on process exit; a close failure is
    /// logged and otherwise ignored.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if let Err(err) = state.sessions.teardown().await {
            tracing::warn!("[App] Failed to close bot session on shutdown: {}", err);
        }
    }

    // ============================================================================
    // Chat
    // ============================================================================

    /// Stores the completion credential for the rest of the process lifetime.
    pub async fn initialize_gpt(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(VocalinkError::config("OpenAI API key is empty"));
        }
        self.completion.set_credential(token.to_string()).await;
        tracing::info!("[App] Completion credential initialized");
        Ok(())
    }

    /// Records `prompt`, asks the completion service and records its reply.
    ///
    /// The user turn stays in history even when the request fails or is
    /// cancelled. An empty candidate list yields [`NO_RESPONSE_REPLY`] and
    /// records nothing more. Cancelling `cancel` releases the orchestrator
    /// lock at once, whether or not the completion client observes it.
    pub async fn chat(&self, prompt: &str, cancel: &CancellationToken) -> Result<String> {
        if !self.completion.has_credential().await {
            return Err(VocalinkError::MissingCredential(
                "OpenAI API key".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        state.history.append_user_turn(prompt);
        let snapshot = state.history.snapshot();

        match run_cancellable(cancel, self.completion.complete(&snapshot, cancel)).await {
            Ok(Some(reply)) => {
                state.history.append_assistant_turn(reply.clone());
                Ok(reply)
            }
            Ok(None) => {
                tracing::info!("[App] Completion returned no candidates");
                Ok(NO_RESPONSE_REPLY.to_string())
            }
            Err(err) if err.is_cancelled() => {
                tracing::info!("[App] Chat cancelled, user turn kept");
                Err(err)
            }
            Err(err) => {
                tracing::warn!("[App] Completion failed, user turn kept: {}", err);
                Err(err)
            }
        }
    }

    /// Snapshot of the conversation for display.
    pub async fn history(&self) -> Vec<ConversationTurn> {
        self.state.lock().await.history.snapshot()
    }

    // ============================================================================
    // Voice (not serialized by the orchestrator lock)
    // ============================================================================

    pub async fn synthesize_audio(
        &self,
        text: &str,
        speaker: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        self.synthesis.synthesize(text, speaker, cancel).await
    }

    pub async fn fetch_speakers(&self, cancel: &CancellationToken) -> Result<Vec<Speaker>> {
        self.synthesis.fetch_speakers(cancel).await
    }

    // ============================================================================
    // Stateless Discord calls
    // ============================================================================

    pub async fn user_guilds(&self, token: &str, cancel: &CancellationToken) -> Result<Vec<Guild>> {
        self.auth.user_guilds(token, cancel).await
    }

    pub async fn fetch_discord_token(
        &self,
        request: &TokenExchange,
        cancel: &CancellationToken,
    ) -> Result<String> {
        self.auth.exchange_code(request, cancel).await
    }

    // ============================================================================
    // Events
    // ============================================================================

    /// Forwards a deep-link URL or second-instance arguments to the frontend.
    pub fn notify_code_received(&self, payload: Vec<String>) {
        let Some(sender) = &self.event_sender else {
            tracing::debug!("[App] No event listener; dropping codeReceived");
            return;
        };
        if sender.send(AppEvent::CodeReceived(payload)).is_err() {
            tracing::warn!("[App] Event listener is gone; dropping codeReceived");
        }
    }
}
