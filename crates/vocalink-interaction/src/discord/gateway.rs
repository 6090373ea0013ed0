//! Minimal Discord gateway client: Hello, Identify, Ready, then a background
//! heartbeat loop that keeps the bot online until shut down. Dropped or
//! recycled sockets are re-identified under a [`ReconnectPolicy`].

use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use vocalink_core::cancel::run_cancellable;
use vocalink_core::platform::PlatformUser;
use vocalink_core::{Result, VocalinkError};

use super::rest::bare_token;

const SERVICE: &str = "Discord gateway";

const OP_DISPATCH: u8 = 0;
const OP_HEARTBEAT: u8 = 1;
const OP_IDENTIFY: u8 = 2;
const OP_RECONNECT: u8 = 7;
const OP_INVALID_SESSION: u8 = 9;
const OP_HELLO: u8 = 10;

const INTENT_GUILDS: u64 = 1 << 0;
const INTENT_GUILD_VOICE_STATES: u64 = 1 << 7;
const INTENT_GUILD_MESSAGES: u64 = 1 << 9;

/// Non-privileged intents requested on identify.
pub const DEFAULT_INTENTS: u64 = INTENT_GUILDS | INTENT_GUILD_VOICE_STATES | INTENT_GUILD_MESSAGES;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Sink = SplitSink<Socket, Message>;
type Stream = SplitStream<Socket>;

#[derive(Debug, Deserialize)]
struct GatewayPayload {
    op: u8,
    #[serde(default)]
    d: Value,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
}

#[derive(Deserialize)]
struct Hello {
    heartbeat_interval: u64,
}

#[derive(Deserialize)]
struct Ready {
    user: PlatformUser,
}

/// How the gateway task recovers when Discord drops or recycles the socket.
///
/// Attempt `n` waits `backoff * n` before identifying again. After
/// `max_attempts` failures the connection reports itself dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Where and as whom to (re)identify.
#[derive(Clone)]
struct Target {
    url: String,
    token: String,
    intents: u64,
}

/// One identified socket.
struct Link {
    sink: Sink,
    stream: Stream,
    period: Duration,
    sequence: Option<u64>,
    user: PlatformUser,
}

/// Why a link stopped serving heartbeats.
enum LinkExit {
    Shutdown,
    Reconnect(String),
    Fatal(VocalinkError),
}

/// An identified gateway connection with its heartbeat and reconnect task.
pub struct GatewayConnection {
    user: PlatformUser,
    alive: watch::Receiver<bool>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl GatewayConnection {
    /// Connects and identifies. Returns once Discord has sent `READY`.
    pub async fn connect(
        url: &str,
        token: &str,
        intents: u64,
        policy: ReconnectPolicy,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        let target = Target {
            url: url.to_string(),
            token: token.to_string(),
            intents,
        };
        let link = run_cancellable(cancel, handshake(&target)).await?;
        tracing::info!(
            "[Gateway] Identified as {} ({})",
            link.user.username,
            link.user.id
        );

        let user = link.user.clone();
        let (alive_tx, alive_rx) = watch::channel(true);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(supervise(link, target, policy, alive_tx, shutdown.clone()));

        Ok(Self {
            user,
            alive: alive_rx,
            shutdown,
            task: Some(task),
        })
    }

    pub fn user(&self) -> &PlatformUser {
        &self.user
    }

    /// False once the task has stopped: shut down, rejected by Discord, or
    /// out of reconnect attempts.
    pub fn is_alive(&self) -> bool {
        *self.alive.borrow()
    }

    /// Resolves when the connection is no longer alive.
    pub async fn disconnected(&self) {
        let mut alive = self.alive.clone();
        // A dropped sender means the task has exited, which is also dead.
        let _ = alive.wait_for(|alive| !*alive).await;
    }

    /// Stops the heartbeat loop and closes the socket. Safe to call twice.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            task.await.map_err(|err| {
                VocalinkError::transport(SERVICE, format!("heartbeat task failed: {err}"))
            })?;
        }
        Ok(())
    }
}

impl Drop for GatewayConnection {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handshake(target: &Target) -> Result<Link> {
    let (socket, _) = connect_async(target.url.as_str())
        .await
        .map_err(|err| VocalinkError::transport(SERVICE, err))?;
    let (mut sink, mut stream) = socket.split();

    let hello = next_payload(&mut stream).await?;
    if hello.op != OP_HELLO {
        return Err(VocalinkError::protocol(format!(
            "Expected gateway Hello, received op {}",
            hello.op
        )));
    }
    let hello: Hello = serde_json::from_value(hello.d)
        .map_err(|err| VocalinkError::protocol(format!("Malformed gateway Hello: {err}")))?;
    let period = Duration::from_millis(hello.heartbeat_interval.max(1));

    send_payload(&mut sink, &identify_payload(&target.token, target.intents)).await?;

    let mut sequence = None;
    let user = timeout(period, wait_for_ready(&mut sink, &mut stream, &mut sequence))
        .await
        .map_err(|_| VocalinkError::protocol("Timed out waiting for gateway READY"))??;

    Ok(Link {
        sink,
        stream,
        period,
        sequence,
        user,
    })
}

/// Serves links until shutdown, re-identifying whenever Discord drops one.
async fn supervise(
    mut link: Link,
    target: Target,
    policy: ReconnectPolicy,
    alive: watch::Sender<bool>,
    shutdown: CancellationToken,
) {
    loop {
        match heartbeat_loop(link, &shutdown).await {
            LinkExit::Shutdown => break,
            LinkExit::Fatal(err) => {
                tracing::warn!("[Gateway] Session ended: {}", err);
                break;
            }
            LinkExit::Reconnect(reason) => {
                tracing::info!("[Gateway] Reconnecting: {}", reason);
                match reconnect(&target, policy, &shutdown).await {
                    Some(next) => link = next,
                    None => break,
                }
            }
        }
    }

    alive.send_replace(false);
    tracing::debug!("[Gateway] Connection task stopped");
}

async fn reconnect(
    target: &Target,
    policy: ReconnectPolicy,
    shutdown: &CancellationToken,
) -> Option<Link> {
    for attempt in 1..=policy.max_attempts {
        let delay = policy.backoff * attempt;
        tokio::select! {
            _ = shutdown.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        match run_cancellable(shutdown, handshake(target)).await {
            Ok(link) => {
                tracing::info!("[Gateway] Reconnected on attempt {}", attempt);
                return Some(link);
            }
            Err(err) if err.is_cancelled() => return None,
            Err(err) if err.is_config() => {
                tracing::warn!("[Gateway] Discord refused to re-identify: {}", err);
                return None;
            }
            Err(err) => {
                tracing::warn!(
                    "[Gateway] Reconnect attempt {}/{} failed: {}",
                    attempt,
                    policy.max_attempts,
                    err
                );
            }
        }
    }

    tracing::warn!(
        "[Gateway] Giving up after {} reconnect attempts",
        policy.max_attempts
    );
    None
}

async fn wait_for_ready(
    sink: &mut Sink,
    stream: &mut Stream,
    sequence: &mut Option<u64>,
) -> Result<PlatformUser> {
    loop {
        let payload = next_payload(stream).await?;
        if payload.s.is_some() {
            *sequence = payload.s;
        }

        match payload.op {
            OP_DISPATCH if payload.t.as_deref() == Some("READY") => {
                let ready: Ready = serde_json::from_value(payload.d).map_err(|err| {
                    VocalinkError::protocol(format!("Malformed gateway READY: {err}"))
                })?;
                return Ok(ready.user);
            }
            OP_HEARTBEAT => send_payload(sink, &heartbeat_payload(*sequence)).await?,
            OP_INVALID_SESSION => {
                return Err(VocalinkError::config(
                    "Discord invalidated the session during identify",
                ));
            }
            _ => {}
        }
    }
}

async fn heartbeat_loop(link: Link, shutdown: &CancellationToken) -> LinkExit {
    let Link {
        mut sink,
        mut stream,
        period,
        mut sequence,
        ..
    } = link;
    let mut ticker = interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                if let Err(err) = sink.send(Message::Close(None)).await {
                    tracing::debug!("[Gateway] Close frame not delivered: {}", err);
                }
                return LinkExit::Shutdown;
            }
            _ = ticker.tick() => {
                if let Err(err) = send_payload(&mut sink, &heartbeat_payload(sequence)).await {
                    return LinkExit::Reconnect(format!("heartbeat failed: {err}"));
                }
            }
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => match parse_payload(text.as_str()) {
                    Ok(payload) => {
                        if payload.s.is_some() {
                            sequence = payload.s;
                        }
                        match payload.op {
                            OP_HEARTBEAT => {
                                let beat = heartbeat_payload(sequence);
                                if let Err(err) = send_payload(&mut sink, &beat).await {
                                    return LinkExit::Reconnect(format!("heartbeat failed: {err}"));
                                }
                            }
                            OP_RECONNECT => {
                                return LinkExit::Reconnect("reconnect requested".into());
                            }
                            OP_INVALID_SESSION => {
                                return LinkExit::Reconnect("session invalidated".into());
                            }
                            _ => {}
                        }
                    }
                    Err(err) => tracing::debug!("[Gateway] Ignoring frame: {}", err),
                },
                Some(Ok(Message::Close(frame))) => {
                    let err = close_error(
                        frame.as_ref().map(|f| u16::from(f.code)),
                        frame.as_ref().map(|f| f.reason.as_str()).unwrap_or(""),
                    );
                    if err.is_config() {
                        return LinkExit::Fatal(err);
                    }
                    return LinkExit::Reconnect(err.to_string());
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return LinkExit::Reconnect(format!("socket error: {err}")),
                None => return LinkExit::Reconnect("socket ended".to_string()),
            }
        }
    }
}

async fn next_payload(stream: &mut Stream) -> Result<GatewayPayload> {
    loop {
        let message = stream
            .next()
            .await
            .ok_or_else(|| VocalinkError::transport(SERVICE, "connection closed"))?
            .map_err(|err| VocalinkError::transport(SERVICE, err))?;

        match message {
            Message::Text(text) => return parse_payload(text.as_str()),
            Message::Close(frame) => {
                return Err(close_error(
                    frame.as_ref().map(|f| u16::from(f.code)),
                    frame.as_ref().map(|f| f.reason.as_str()).unwrap_or(""),
                ));
            }
            _ => {}
        }
    }
}

async fn send_payload(sink: &mut Sink, payload: &Value) -> Result<()> {
    sink.send(Message::text(payload.to_string()))
        .await
        .map_err(|err| VocalinkError::transport(SERVICE, err))
}

fn parse_payload(text: &str) -> Result<GatewayPayload> {
    serde_json::from_str(text)
        .map_err(|err| VocalinkError::protocol(format!("Malformed gateway frame: {err}")))
}

fn identify_payload(token: &str, intents: u64) -> Value {
    json!({
        "op": OP_IDENTIFY,
        "d": {
            "token": bare_token(token),
            "intents": intents,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "vocalink",
                "device": "vocalink"
            }
        }
    })
}

fn heartbeat_payload(sequence: Option<u64>) -> Value {
    json!({ "op": OP_HEARTBEAT, "d": sequence })
}

/// Maps a gateway close code to an error; authentication and intent codes
/// are configuration problems, everything else is transport.
fn close_error(code: Option<u16>, reason: &str) -> VocalinkError {
    match code {
        Some(4004) => VocalinkError::config("Discord rejected the bot token"),
        Some(code @ (4013 | 4014)) => VocalinkError::config(format!(
            "Discord rejected the gateway intents ({code}): {reason}"
        )),
        Some(code) => {
            VocalinkError::transport(SERVICE, format!("closed with code {code}: {reason}"))
        }
        None => VocalinkError::transport(SERVICE, "connection closed"),
    }
}
