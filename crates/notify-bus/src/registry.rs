//! # Handler Registry
//!
//! Ordered per-event handler lists shared by every transport implementation.

use crate::transport::{EventHandler, Payload, Unsubscribe};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

struct HandlerEntry {
    id: u64,
    handler: EventHandler,
}

/// Event name -> handlers, in subscription order.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Vec<HandlerEntry>>>,
    next_id: AtomicU64,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Append `handler` to the list for `event`.
    ///
    /// The returned handle holds only a weak reference, so a transport that
    /// has been dropped is not kept alive by outstanding subscriptions.
    pub fn register(self: &Arc<Self>, event: &str, handler: EventHandler) -> Unsubscribe {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers
            .write()
            .entry(event.to_string())
            .or_default()
            .push(HandlerEntry { id, handler });

        debug!(event, handler_id = id, "Handler registered");

        let registry = Arc::downgrade(self);
        let event = event.to_string();
        Unsubscribe::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.remove(&event, id);
            }
        })
    }

    fn remove(&self, event: &str, id: u64) {
        let mut handlers = self.handlers.write();
        let Some(list) = handlers.get_mut(event) else {
            return;
        };

        list.retain(|entry| entry.id != id);
        if list.is_empty() {
            handlers.remove(event);
        }
        debug!(event, handler_id = id, "Handler released");
    }

    /// Invoke every handler for `event` in subscription order.
    ///
    /// The lock is not held while handlers run, so a handler may subscribe
    /// or unsubscribe. Returns the number of handlers invoked.
    pub fn dispatch(&self, event: &str, payload: &Payload) -> usize {
        let handlers: Vec<EventHandler> = {
            let guard = self.handlers.read();
            match guard.get(event) {
                Some(list) => list.iter().map(|entry| entry.handler.clone()).collect(),
                None => Vec::new(),
            }
        };

        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }

    /// Number of handlers currently registered for `event`.
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.read().get(event).map_or(0, Vec::len)
    }

    /// Number of handlers across all events.
    pub fn total_handlers(&self) -> usize {
        self.handlers.read().values().map(Vec::len).sum()
    }
}
