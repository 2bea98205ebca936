//! # Transport Client Port
//!
//! Defines what the notification center needs from a transport and the
//! release handle returned by every subscription.

use crate::state::ConnectionState;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Payload carried by every event, inbound or outbound.
pub type Payload = serde_json::Value;

/// Callback invoked with each inbound payload of a subscribed event.
pub type EventHandler = Arc<dyn Fn(&Payload) + Send + Sync>;

/// A single authenticated bidirectional channel.
///
/// Connection establishment, the authentication handshake and reconnect
/// backoff all live behind this trait.
pub trait TransportClient: Send + Sync {
    /// Current connection state.
    fn state(&self) -> ConnectionState;

    /// Receiver that observes every state change.
    ///
    /// Each completed handshake must publish a ready state with a fresh
    /// [`ConnectionState::session`], so watchers that only see the latest
    /// value can still tell one session from the next.
    fn watch_state(&self) -> watch::Receiver<ConnectionState>;

    /// Fire-and-forget send. Dropped silently if the channel is down.
    fn send(&self, event: &str, payload: Payload);

    /// Register `handler` for `event`.
    ///
    /// The handler stays registered until the returned handle is released
    /// or dropped.
    fn subscribe(&self, event: &str, handler: EventHandler) -> Unsubscribe;
}

impl<T: TransportClient + ?Sized> TransportClient for Arc<T> {
    fn state(&self) -> ConnectionState {
        (**self).state()
    }

    fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        (**self).watch_state()
    }

    fn send(&self, event: &str, payload: Payload) {
        (**self).send(event, payload)
    }

    fn subscribe(&self, event: &str, handler: EventHandler) -> Unsubscribe {
        (**self).subscribe(event, handler)
    }
}

/// Release handle for a subscription.
///
/// When dropped, the subscription is automatically released.
#[must_use = "dropping the handle releases the subscription immediately"]
pub struct Unsubscribe {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Unsubscribe {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Handle that releases nothing.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Release the subscription now.
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("pending", &self.release.is_some())
            .finish()
    }
}
