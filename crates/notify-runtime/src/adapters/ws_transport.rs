//! WebSocket implementation of [`TransportClient`].
//!
//! Frames are JSON text messages `{"event": <name>, "data": <payload>}`.
//! With a token configured the session is not ready until the server
//! answers `authenticate` with `authenticated`; `unauthorized` ends the
//! connection loop.

use futures_util::{SinkExt, StreamExt};
use notify_bus::{ConnectionState, EventHandler, HandlerRegistry, Payload, TransportClient, Unsubscribe};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Event carrying the session token.
pub const AUTHENTICATE_EVENT: &str = "authenticate";
/// Server acknowledgement of a valid token.
pub const AUTHENTICATED_EVENT: &str = "authenticated";
/// Server rejection of the token.
pub const UNAUTHORIZED_EVENT: &str = "unauthorized";

/// Base delay between reconnection attempts (exponential backoff).
const RECONNECT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Maximum delay between reconnection attempts.
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// WebSocket transport failure.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("Socket error: {0}")]
    Socket(String),

    #[error("Invalid frame: {0}")]
    Codec(String),

    #[error("Authentication rejected: {0}")]
    Unauthorized(String),
}

/// One text frame on the socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    pub fn encode(&self) -> Result<String, TransportError> {
        serde_json::to_string(self).map_err(|e| TransportError::Codec(e.to_string()))
    }

    pub fn decode(text: &str) -> Result<Self, TransportError> {
        serde_json::from_str(text).map_err(|e| TransportError::Codec(e.to_string()))
    }
}

/// Connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsConfig {
    pub url: String,
    /// Session token; without one the socket is ready as soon as it opens.
    pub token: Option<String>,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Give up after this many consecutive failures. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl WsConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            base_delay: RECONNECT_BASE_DELAY,
            max_delay: MAX_RECONNECT_DELAY,
            max_attempts: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Delay before reconnection attempt `attempt` (1-based): doubles from
/// `base` and never exceeds `max`.
pub fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    let factor = 1u32 << attempt.saturating_sub(1).min(16);
    std::cmp::min(base.saturating_mul(factor), max)
}

struct Shared {
    handlers: Arc<HandlerRegistry>,
    state: watch::Sender<ConnectionState>,
    /// Writer queue of the live connection, if any.
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    shutdown: watch::Sender<bool>,
    /// Handshakes completed so far.
    sessions: AtomicU64,
}

impl Shared {
    /// Publish the ready state under a new session number.
    fn begin_session(&self) {
        let session = self.sessions.fetch_add(1, Ordering::Relaxed) + 1;
        self.set_state(ConnectionState::ready(session));
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            info!(
                connected = state.is_connected,
                authenticated = state.is_authenticated,
                session = state.session,
                "Transport state changed"
            );
        }
    }
}

/// WebSocket transport with automatic reconnection.
pub struct WsTransport {
    shared: Arc<Shared>,
}

impl WsTransport {
    /// Spawn the connection loop and return the transport with the loop's
    /// task handle. The loop ends on [`WsTransport::close`], on an
    /// `unauthorized` reply, or after `max_attempts` consecutive failures.
    pub fn connect(config: WsConfig) -> (Arc<Self>, JoinHandle<()>) {
        let (state, _) = watch::channel(ConnectionState::DISCONNECTED);
        let (shutdown, _) = watch::channel(false);
        let shared = Arc::new(Shared {
            handlers: HandlerRegistry::new(),
            state,
            outbound: Mutex::new(None),
            shutdown,
            sessions: AtomicU64::new(0),
        });

        let task = tokio::spawn(connection_loop(shared.clone(), config));
        (Arc::new(Self { shared }), task)
    }

    /// Stop reconnecting and close the current socket.
    pub fn close(&self) {
        self.shared.shutdown.send_replace(true);
    }
}

impl TransportClient for WsTransport {
    fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    fn send(&self, event: &str, payload: Payload) {
        if !self.state().is_connected {
            warn!(event, "Frame dropped (transport disconnected)");
            return;
        }

        let text = match Frame::new(event, payload).encode() {
            Ok(text) => text,
            Err(e) => {
                warn!(event, error = %e, "Frame dropped");
                return;
            }
        };

        let queued = match self.shared.outbound.lock().as_ref() {
            Some(tx) => tx.send(text).is_ok(),
            None => false,
        };
        if queued {
            debug!(event, "Frame queued");
        } else {
            warn!(event, "Frame dropped (writer gone)");
        }
    }

    fn subscribe(&self, event: &str, handler: EventHandler) -> Unsubscribe {
        self.shared.handlers.register(event, handler)
    }
}

/// How a single connection ended.
enum Closed {
    /// Server or local close; reconnect unless shutting down.
    Clean,
    /// Shutdown requested.
    Shutdown,
}

async fn connection_loop(shared: Arc<Shared>, config: WsConfig) {
    let mut shutdown = shared.shutdown.subscribe();
    let mut attempts = 0u32;

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }

        let result = run_connection(&shared, &config).await;
        *shared.outbound.lock() = None;
        shared.set_state(ConnectionState::DISCONNECTED);

        match result {
            Ok(Closed::Shutdown) => break,
            Ok(Closed::Clean) => {
                info!(url = %config.url, "Connection closed, reconnecting");
                attempts = 0;
            }
            Err(TransportError::Unauthorized(reason)) => {
                error!(reason = %reason, "Authentication rejected, giving up");
                break;
            }
            Err(e) => {
                attempts += 1;
                warn!(error = %e, attempts, "Connection failed");
            }
        }

        if let Some(max) = config.max_attempts {
            if attempts >= max {
                error!(attempts, "Reconnection failed after {} attempts", max);
                break;
            }
        }

        let delay = backoff_delay(attempts.max(1), config.base_delay, config.max_delay);
        debug!(delay_ms = delay.as_millis() as u64, "Waiting before reconnect");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => break,
        }
    }

    debug!("Connection loop stopped");
}

async fn run_connection(shared: &Shared, config: &WsConfig) -> Result<Closed, TransportError> {
    let (ws_stream, _) = connect_async(config.url.as_str())
        .await
        .map_err(|e| TransportError::Connect {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;

    let (mut write, mut read) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    *shared.outbound.lock() = Some(tx);

    match &config.token {
        Some(token) => {
            shared.set_state(ConnectionState::CONNECTED);
            let hello = Frame::new(AUTHENTICATE_EVENT, json!({ "token": token })).encode()?;
            write
                .send(Message::Text(hello.into()))
                .await
                .map_err(|e| TransportError::Socket(e.to_string()))?;
        }
        None => shared.begin_session(),
    }

    let mut shutdown = shared.shutdown.subscribe();

    loop {
        tokio::select! {
            outgoing = rx.recv() => {
                let Some(text) = outgoing else { continue };
                write
                    .send(Message::Text(text.into()))
                    .await
                    .map_err(|e| TransportError::Socket(e.to_string()))?;
            }
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => handle_text(shared, text.as_str())?,
                Some(Ok(Message::Ping(data))) => {
                    let _ = write.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) | None => return Ok(Closed::Clean),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(TransportError::Socket(e.to_string())),
            },
            _ = shutdown.changed() => {
                let _ = write.send(Message::Close(None)).await;
                return Ok(Closed::Shutdown);
            }
        }
    }
}

fn handle_text(shared: &Shared, text: &str) -> Result<(), TransportError> {
    let frame = match Frame::decode(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "Ignoring undecodable frame");
            return Ok(());
        }
    };

    match frame.event.as_str() {
        AUTHENTICATED_EVENT => {
            shared.begin_session();
            Ok(())
        }
        UNAUTHORIZED_EVENT => Err(TransportError::Unauthorized(frame.data.to_string())),
        event => {
            let receivers = shared.handlers.dispatch(event, &frame.data);
            if receivers == 0 {
                debug!(event, "No handler for inbound frame");
            }
            Ok(())
        }
    }
}
