use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use vocalink_core::platform::{BotInfo, Guild, GuildMember, PlatformSession, SessionFactory};
use vocalink_core::{Result, VocalinkError};

/// Owns the single messaging-platform session.
///
/// `SessionManager` is responsible for:
/// - Replacing the live session on re-initialization (old one closed first)
/// - Closing a half-started session so no connection outlives a failed start
/// - Refusing reads while disconnected, including after the held session
///   lost its connection for good
///
/// It holds no lock of its own; [`App`](crate::App) keeps it behind the
/// orchestrator mutex so that every transition is one critical section.
pub struct SessionManager {
    factory: Arc<dyn SessionFactory>,
    session: Option<Box<dyn PlatformSession>>,
}

impl SessionManager {
    pub fn new(factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            factory,
            session: None,
        }
    }

    /// True while a session is held and still online.
    pub fn is_connected(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.is_connected())
    }

    /// Connects with `token`, replacing any live session.
    ///
    /// # Errors
    ///
    /// - `Config` if the token is empty; the current session is left untouched
    /// - whatever the factory or session start reports; the manager is then
    ///   disconnected
    pub async fn initialize(&mut self, token: &str, cancel: &CancellationToken) -> Result<()> {
        if token.trim().is_empty() {
            return Err(VocalinkError::config("Bot token is empty"));
        }

        if self.session.is_some() {
            tracing::info!("[SessionManager] Replacing the active bot session");
            if let Err(err) = self.teardown().await {
                tracing::warn!("[SessionManager] Failed to close previous session: {}", err);
            }
        }

        let mut session = self.factory.create(token)?;
        if let Err(err) = session.start(cancel).await {
            tracing::warn!("[SessionManager] Bot session failed to start: {}", err);
            if let Err(close_err) = session.close().await {
                tracing::warn!(
                    "[SessionManager] Failed to close half-started session: {}",
                    close_err
                );
            }
            return Err(err);
        }

        if let Some(info) = session.bot_info() {
            tracing::info!("[SessionManager] Bot session connected as {}", info.username);
        }
        self.session = Some(session);
        Ok(())
    }

    /// Closes the live session, if any. The manager is disconnected afterwards
    /// even when closing reports an error.
    pub async fn teardown(&mut self) -> Result<()> {
        match self.session.take() {
            Some(mut session) => {
                tracing::info!("[SessionManager] Closing bot session");
                session.close().await
            }
            None => Ok(()),
        }
    }

    pub fn bot_info(&self) -> Result<BotInfo> {
        self.active()?
            .bot_info()
            .ok_or_else(|| VocalinkError::protocol("Connected session has no bot identity"))
    }

    pub async fn guilds(&self, cancel: &CancellationToken) -> Result<Vec<Guild>> {
        self.active()?.guilds(cancel).await
    }

    pub async fn guild_members(
        &self,
        guild_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<GuildMember>> {
        self.active()?.guild_members(guild_id, cancel).await
    }

    fn active(&self) -> Result<&dyn PlatformSession> {
        self.session
            .as_deref()
            .filter(|session| session.is_connected())
            .ok_or(VocalinkError::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Create(String),
        Start(String),
        Close(String),
    }

    type Log = Arc<Mutex<Vec<Call>>>;

    // Mock session recording lifecycle calls into a shared log
    struct MockSession {
        token: String,
        log: Log,
        fail_start: bool,
        fail_close: bool,
        started: bool,
        offline: Arc<AtomicBool>,
    }

    #[async_trait]
    impl PlatformSession for MockSession {
        async fn start(&mut self, _cancel: &CancellationToken) -> Result<()> {
            self.log.lock().unwrap().push(Call::Start(self.token.clone()));
            if self.fail_start {
                return Err(VocalinkError::transport("Discord gateway", "handshake refused"));
            }
            self.started = true;
            Ok(())
        }

        async fn close(&mut self) -> Result<()> {
            self.log.lock().unwrap().push(Call::Close(self.token.clone()));
            self.started = false;
            if self.fail_close {
                return Err(VocalinkError::transport("Discord gateway", "socket already gone"));
            }
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.started && !self.offline.load(Ordering::SeqCst)
        }

        fn bot_info(&self) -> Option<BotInfo> {
            self.is_connected().then(|| BotInfo {
                username: format!("bot-{}", self.token),
                avatar_url: String::new(),
            })
        }

        async fn guilds(&self, _cancel: &CancellationToken) -> Result<Vec<Guild>> {
            Ok(vec![Guild {
                id: "1".into(),
                name: format!("guild-of-{}", self.token),
                icon: None,
                owner: false,
                permissions: None,
            }])
        }

        async fn guild_members(
            &self,
            _guild_id: &str,
            _cancel: &CancellationToken,
        ) -> Result<Vec<GuildMember>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct MockFactory {
        log: Log,
        fail_start_for: Option<String>,
        fail_close: bool,
        offline: Arc<AtomicBool>,
    }

    impl SessionFactory for MockFactory {
        fn create(&self, token: &str) -> Result<Box<dyn PlatformSession>> {
            self.log.lock().unwrap().push(Call::Create(token.to_string()));
            Ok(Box::new(MockSession {
                token: token.to_string(),
                log: self.log.clone(),
                fail_start: self.fail_start_for.as_deref() == Some(token),
                fail_close: self.fail_close,
                started: false,
                offline: self.offline.clone(),
            }))
        }
    }

    fn manager(factory: MockFactory) -> (SessionManager, Log) {
        let log = factory.log.clone();
        (SessionManager::new(Arc::new(factory)), log)
    }

    #[tokio::test]
    async fn test_reinitialize_closes_old_before_starting_new() {
        let (mut manager, log) = manager(MockFactory::default());
        let cancel = CancellationToken::new();

        manager.initialize("first", &cancel).await.unwrap();
        manager.initialize("second", &cancel).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Call::Create("first".into()),
                Call::Start("first".into()),
                Call::Close("first".into()),
                Call::Create("second".into()),
                Call::Start("second".into()),
            ]
        );
        assert!(manager.is_connected());
        assert_eq!(manager.bot_info().unwrap().username, "bot-second");
    }

    #[tokio::test]
    async fn test_failed_start_leaves_disconnected_and_closes_partial_session() {
        let (mut manager, log) = manager(MockFactory {
            fail_start_for: Some("bad".into()),
            ..Default::default()
        });
        let cancel = CancellationToken::new();

        manager.initialize("good", &cancel).await.unwrap();
        let err = manager.initialize("bad", &cancel).await.unwrap_err();

        assert!(err.is_transport());
        assert!(!manager.is_connected());
        assert_eq!(
            log.lock().unwrap().last(),
            Some(&Call::Close("bad".into()))
        );
        assert_eq!(
            manager.guilds(&cancel).await.unwrap_err(),
            VocalinkError::NotConnected
        );
    }

    #[tokio::test]
    async fn test_close_failure_does_not_abort_reinitialize() {
        let (mut manager, _log) = manager(MockFactory {
            fail_close: true,
            ..Default::default()
        });
        let cancel = CancellationToken::new();

        manager.initialize("first", &cancel).await.unwrap();
        manager.initialize("second", &cancel).await.unwrap();

        assert_eq!(manager.bot_info().unwrap().username, "bot-second");
    }

    #[tokio::test]
    async fn test_empty_token_keeps_current_session() {
        let (mut manager, log) = manager(MockFactory::default());
        let cancel = CancellationToken::new();

        manager.initialize("first", &cancel).await.unwrap();
        let err = manager.initialize("  ", &cancel).await.unwrap_err();

        assert!(err.is_config());
        assert!(manager.is_connected());
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reads_while_disconnected_are_state_errors() {
        let (manager, _log) = manager(MockFactory::default());
        let cancel = CancellationToken::new();

        assert_eq!(
            manager.guilds(&cancel).await.unwrap_err(),
            VocalinkError::NotConnected
        );
        assert_eq!(
            manager.guild_members("1", &cancel).await.unwrap_err(),
            VocalinkError::NotConnected
        );
        assert!(manager.bot_info().unwrap_err().is_state());
    }

    #[tokio::test]
    async fn test_session_that_went_offline_reads_as_disconnected() {
        let factory = MockFactory::default();
        let offline = factory.offline.clone();
        let (mut manager, log) = manager(factory);
        let cancel = CancellationToken::new();

        manager.initialize("first", &cancel).await.unwrap();
        offline.store(true, Ordering::SeqCst);

        assert!(!manager.is_connected());
        assert_eq!(
            manager.guilds(&cancel).await.unwrap_err(),
            VocalinkError::NotConnected
        );
        assert!(manager.bot_info().unwrap_err().is_state());

        // Re-initializing still closes the dead session before replacing it.
        offline.store(false, Ordering::SeqCst);
        manager.initialize("second", &cancel).await.unwrap();
        assert!(log.lock().unwrap().contains(&Call::Close("first".into())));
        assert_eq!(manager.bot_info().unwrap().username, "bot-second");
    }

    #[tokio::test]
    async fn test_teardown_is_idempotent() {
        let (mut manager, log) = manager(MockFactory::default());
        let cancel = CancellationToken::new();

        manager.teardown().await.unwrap();
        manager.initialize("only", &cancel).await.unwrap();
        manager.teardown().await.unwrap();
        manager.teardown().await.unwrap();

        assert!(!manager.is_connected());
        let closes = log
            .lock()
            .unwrap()
            .iter()
            .filter(|call| matches!(call, Call::Close(_)))
            .count();
        assert_eq!(closes, 1);
    }
}
