//! # In-Memory Transport
//!
//! A [`TransportClient`] that never leaves the process. Tests and local
//! wiring use it to drive connection transitions, inject server pushes and
//! inspect what the client sent.

use crate::registry::HandlerRegistry;
use crate::state::ConnectionState;
use crate::transport::{EventHandler, Payload, TransportClient, Unsubscribe};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// One outbound frame recorded by [`InMemoryTransport`].
#[derive(Clone, Debug, PartialEq)]
pub struct SentFrame {
    pub event: String,
    pub payload: Payload,
}

/// In-memory implementation of the transport client.
///
/// Suitable for tests and single-process wiring; the runtime uses a
/// WebSocket implementation of the same trait.
pub struct InMemoryTransport {
    /// Subscribed handlers by event.
    handlers: Arc<HandlerRegistry>,

    /// Current connection state.
    state: watch::Sender<ConnectionState>,

    /// Frames accepted by `send`, oldest first.
    sent: Mutex<Vec<SentFrame>>,

    /// Total frames accepted.
    frames_sent: AtomicU64,

    /// Total frames dropped because the channel was down.
    frames_dropped: AtomicU64,

    /// Handshakes completed so far.
    sessions: AtomicU64,
}

impl InMemoryTransport {
    /// Create a disconnected transport.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConnectionState::DISCONNECTED);
        Self {
            handlers: HandlerRegistry::new(),
            state,
            sent: Mutex::new(Vec::new()),
            frames_sent: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
            sessions: AtomicU64::new(0),
        }
    }

    /// Publish a new connection state. Receivers are notified even when the
    /// value is unchanged, mirroring a transport that re-announces its state.
    pub fn set_state(&self, state: ConnectionState) {
        debug!(
            connected = state.is_connected,
            authenticated = state.is_authenticated,
            session = state.session,
            "Transport state set"
        );
        self.state.send_replace(state);
    }

    /// Complete a new handshake: publishes the ready state under the next
    /// session number.
    pub fn connect_and_authenticate(&self) {
        let session = self.sessions.fetch_add(1, Ordering::Relaxed) + 1;
        self.set_state(ConnectionState::ready(session));
    }

    pub fn disconnect(&self) {
        self.set_state(ConnectionState::DISCONNECTED);
    }

    /// Simulate the server pushing `payload` under `event`.
    ///
    /// Returns the number of handlers invoked.
    pub fn deliver(&self, event: &str, payload: Payload) -> usize {
        let receivers = self.handlers.dispatch(event, &payload);
        debug!(event, receivers, "Inbound event delivered");
        receivers
    }

    /// Copy of every accepted frame, oldest first.
    pub fn sent(&self) -> Vec<SentFrame> {
        self.sent.lock().clone()
    }

    /// Accepted frames for one event name.
    pub fn sent_for(&self, event: &str) -> Vec<SentFrame> {
        self.sent
            .lock()
            .iter()
            .filter(|frame| frame.event == event)
            .cloned()
            .collect()
    }

    /// Drain the accepted frames.
    pub fn take_sent(&self) -> Vec<SentFrame> {
        std::mem::take(&mut *self.sent.lock())
    }

    /// Number of handlers registered for `event`.
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.handler_count(event)
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportClient for InMemoryTransport {
    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn send(&self, event: &str, payload: Payload) {
        if !self.state().is_connected {
            self.frames_dropped.fetch_add(1, Ordering::Relaxed);
            warn!(event, "Frame dropped (transport disconnected)");
            return;
        }

        self.frames_sent.fetch_add(1, Ordering::Relaxed);
        debug!(event, "Frame sent");
        self.sent.lock().push(SentFrame {
            event: event.to_string(),
            payload,
        });
    }

    fn subscribe(&self, event: &str, handler: EventHandler) -> Unsubscribe {
        self.handlers.register(event, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_default_transport() {
        let transport = InMemoryTransport::default();
        assert_eq!(transport.state(), ConnectionState::DISCONNECTED);
        assert_eq!(transport.frames_sent(), 0);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_send_while_disconnected_is_dropped() {
        let transport = InMemoryTransport::new();
        transport.send("evt", json!({ "a": 1 }));

        assert!(transport.sent().is_empty());
        assert_eq!(transport.frames_dropped(), 1);
    }

    #[test]
    fn test_send_while_connected_is_recorded() {
        let transport = InMemoryTransport::new();
        transport.set_state(ConnectionState::CONNECTED);
        transport.send("evt", json!({ "a": 1 }));
        transport.send("other", json!({ "b": 2 }));

        assert_eq!(transport.frames_sent(), 2);
        assert_eq!(transport.sent_for("evt").len(), 1);
        assert_eq!(transport.take_sent().len(), 2);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_deliver_reaches_subscribers() {
        let transport = InMemoryTransport::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        let handle = transport.subscribe(
            "push",
            Arc::new(move |_: &Payload| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(transport.deliver("push", json!({})), 1);
        handle.release();
        assert_eq!(transport.deliver("push", json!({})), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(transport.handler_count("push"), 0);
    }

    #[tokio::test]
    async fn test_watch_state_observes_transitions() {
        let transport = InMemoryTransport::new();
        let mut rx = transport.watch_state();

        transport.connect_and_authenticate();
        timeout(Duration::from_millis(100), rx.changed())
            .await
            .expect("timeout")
            .expect("sender alive");
        let first = *rx.borrow_and_update();
        assert!(first.is_ready());
        assert_eq!(first.session, 1);

        transport.disconnect();
        timeout(Duration::from_millis(100), rx.changed())
            .await
            .expect("timeout")
            .expect("sender alive");
        assert!(!rx.borrow_and_update().is_ready());
    }

    #[tokio::test]
    async fn test_fast_reconnect_is_visible_to_late_watcher() {
        let transport = InMemoryTransport::new();
        transport.connect_and_authenticate();
        let mut rx = transport.watch_state();
        let seen = *rx.borrow_and_update();

        transport.disconnect();
        transport.connect_and_authenticate();

        timeout(Duration::from_millis(100), rx.changed())
            .await
            .expect("timeout")
            .expect("sender alive");
        let latest = *rx.borrow_and_update();
        assert!(latest.is_ready());
        assert_ne!(latest, seen);
        assert_eq!(latest.session, 2);
    }
}
