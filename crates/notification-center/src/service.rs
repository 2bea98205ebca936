//! Notification Center Service - wiring of store, reconciliation, read-state
//! sync and subscription lifecycle
//!
//! ## Concurrency
//!
//! Every mutation (inbound handler or UI call) runs to completion under the
//! state lock, so an unread count read after any call is exact. Unread
//! signals are broadcast before the lock is released, so they arrive in
//! mutation order. The lock is never held across a transport call: a
//! transport is free to invoke handlers synchronously from inside `send` or
//! `subscribe`.

use crate::config::CenterConfig;
use crate::domain::{
    ConnectionEdge, EdgeDetector, InboundStream, NotificationStore, Outbox, ReconcileReport,
    Reconciler,
};
use crate::error::{CenterError, CenterResult};
use crate::metrics;
use crate::ports::inbound::NotificationCenterApi;
use crate::registry::SubscriptionRegistry;
use crate::signals::{signal_stream, CenterSignal};
use chrono::Utc;
use notify_bus::{ConnectionState, EventHandler, Payload, TransportClient};
use notify_types::{Notification, NotificationId, OutboundMessage, UserId};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, watch};
use tokio_stream::Stream;
use tracing::{debug, info, warn};

/// Mutable state guarded by one lock
struct CenterState {
    store: NotificationStore,
    outbox: Outbox,
    edges: EdgeDetector,
}

struct CenterInner<T: TransportClient> {
    config: CenterConfig,
    user_id: UserId,
    transport: Arc<T>,
    reconciler: Reconciler,
    state: Mutex<CenterState>,
    registry: Mutex<SubscriptionRegistry>,
    signals: broadcast::Sender<CenterSignal>,
    shutdown: watch::Sender<bool>,
}

/// Real-time notification center for one signed-in user.
///
/// Cheap to clone; clones share the same store and subscriptions. The
/// subscriptions are released when the last clone is dropped.
pub struct NotificationCenter<T: TransportClient + 'static> {
    inner: Arc<CenterInner<T>>,
}

impl<T: TransportClient + 'static> Clone for NotificationCenter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: TransportClient + 'static> NotificationCenter<T> {
    /// Create a center bound to `transport`. Nothing is subscribed until the
    /// transport reports itself connected and authenticated.
    pub fn new(config: CenterConfig, user_id: UserId, transport: Arc<T>) -> CenterResult<Self> {
        config.validate()?;

        let (signals, _) = broadcast::channel(config.signal_capacity);
        let (shutdown, _) = watch::channel(false);
        let reconciler = Reconciler::new(config.validation);

        Ok(Self {
            inner: Arc::new(CenterInner {
                config,
                user_id,
                transport,
                reconciler,
                state: Mutex::new(CenterState {
                    store: NotificationStore::new(),
                    outbox: Outbox::new(),
                    edges: EdgeDetector::new(),
                }),
                registry: Mutex::new(SubscriptionRegistry::new()),
                signals,
                shutdown,
            }),
        })
    }

    pub fn config(&self) -> &CenterConfig {
        &self.inner.config
    }

    pub fn user_id(&self) -> &UserId {
        &self.inner.user_id
    }

    /// Feed the transport's current state. Acts only on edges: entering
    /// ready subscribes, requests one snapshot and flushes the outbox;
    /// leaving ready releases the subscriptions.
    pub fn handle_connection_state(&self, state: ConnectionState) {
        let edge = self.inner.state.lock().edges.observe(state);
        match edge {
            Some(ConnectionEdge::Ready) => self.inner.on_ready(),
            Some(ConnectionEdge::Lost) => self.inner.on_lost(),
            None => {}
        }
    }

    /// Follow the transport's state until [`NotificationCenter::shutdown`] is
    /// called or the transport's state channel closes, then release the
    /// subscriptions.
    pub async fn run(&self) {
        let mut states = self.inner.transport.watch_state();
        let mut shutdown = self.inner.shutdown.subscribe();

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            let state = *states.borrow_and_update();
            self.handle_connection_state(state);

            tokio::select! {
                changed = states.changed() => {
                    if changed.is_err() {
                        debug!("Transport state channel closed");
                        break;
                    }
                }
                _ = shutdown.changed() => {}
            }
        }

        self.inner.teardown();
    }

    /// Stop [`NotificationCenter::run`] and release the subscriptions now.
    pub fn shutdown(&self) {
        self.inner.shutdown.send_replace(true);
        self.inner.teardown();
    }

    /// Whether the live-push and snapshot handlers are currently registered.
    pub fn is_subscribed(&self) -> bool {
        self.inner.registry.lock().is_active()
    }

    /// Receiver of every signal published from now on.
    pub fn signals(&self) -> broadcast::Receiver<CenterSignal> {
        self.inner.signals.subscribe()
    }

    /// [`NotificationCenter::signals`] as a stream.
    pub fn signal_stream(&self) -> impl Stream<Item = CenterSignal> {
        signal_stream(self.signals())
    }
}

impl<T: TransportClient + 'static> NotificationCenterApi for NotificationCenter<T> {
    fn mark_read(&self, id: &NotificationId) -> bool {
        let (present, flipped) = {
            let mut state = self.inner.state.lock();
            let present = state.store.contains(id);
            let flipped = state.store.mark_read(id);
            if flipped {
                self.inner.publish_unread(state.store.unread_count());
            }
            (present, flipped)
        };

        if present {
            self.inner
                .deliver_read_state(OutboundMessage::mark_read(id.clone()));
        } else {
            debug!(id = %id, "mark_read on unknown id ignored");
        }
        flipped
    }

    fn mark_all_read(&self) -> usize {
        let flipped = {
            let mut state = self.inner.state.lock();
            let flipped = state.store.mark_all_read();
            if flipped > 0 {
                self.inner.publish_unread(0);
            }
            flipped
        };

        self.inner
            .deliver_read_state(OutboundMessage::mark_all_read(self.inner.user_id.clone()));
        flipped
    }

    fn unread_count(&self) -> usize {
        self.inner.state.lock().store.unread_count()
    }

    fn notifications(&self) -> Vec<Notification> {
        self.inner.state.lock().store.to_vec()
    }

    fn get(&self, id: &NotificationId) -> Option<Notification> {
        self.inner.state.lock().store.get(id).cloned()
    }

    fn pending_outbound(&self) -> usize {
        self.inner.state.lock().outbox.len()
    }
}

impl<T: TransportClient + 'static> CenterInner<T> {
    fn on_ready(self: &Arc<Self>) {
        let live_push = self.handler(InboundStream::LivePush);
        let snapshot = self.handler(InboundStream::Snapshot);
        self.registry
            .lock()
            .acquire(&*self.transport, &self.config.events, live_push, snapshot);

        self.send(OutboundMessage::snapshot_request(self.user_id.clone()));
        self.flush_outbox();
    }

    /// Redeliver everything queued while offline, oldest first.
    fn flush_outbox(&self) {
        let pending = self.state.lock().outbox.drain();
        if pending.is_empty() {
            return;
        }

        info!(count = pending.len(), "Flushing outbox");
        for message in pending {
            self.deliver_read_state(message);
        }
    }

    fn on_lost(&self) {
        self.registry.lock().release();
    }

    fn teardown(&self) {
        if self.registry.lock().release() {
            info!("Notification center torn down");
        }
    }

    /// Handler that folds inbound payloads of `stream` into the store.
    ///
    /// Holds a weak reference: the transport owning the handler must not keep
    /// the center alive.
    fn handler(self: &Arc<Self>, stream: InboundStream) -> EventHandler {
        let inner: Weak<Self> = Arc::downgrade(self);
        Arc::new(move |payload: &Payload| {
            if let Some(inner) = inner.upgrade() {
                inner.on_inbound(stream, payload);
            }
        })
    }

    fn on_inbound(&self, stream: InboundStream, payload: &Payload) {
        let received_at = Utc::now();

        let result = {
            let mut state = self.state.lock();
            let before = state.store.unread_count();
            let result = match stream {
                InboundStream::LivePush => {
                    Ok(self
                        .reconciler
                        .fold_live(&mut state.store, payload, received_at))
                }
                InboundStream::Snapshot => {
                    self.reconciler
                        .fold_snapshot(&mut state.store, payload, received_at)
                }
            };
            let after = state.store.unread_count();
            if before != after {
                self.publish_unread(after);
            }
            result
        };

        match result {
            Ok(report) => self.report_reconciliation(stream, report),
            Err(source) => {
                warn!(stream = stream.as_str(), error = %source, "Inbound payload malformed");
                metrics::record_rejected(source.reason());
                self.publish(CenterSignal::RecoverableError(CenterError::MalformedBatch {
                    stream: stream.as_str(),
                    source,
                }));
            }
        }
    }

    fn report_reconciliation(&self, stream: InboundStream, report: ReconcileReport) {
        metrics::record_received(stream.as_str(), report.accepted() + report.rejected.len());
        metrics::record_merges(report.duplicates, report.read_upgraded);

        debug!(
            stream = stream.as_str(),
            inserted = report.inserted,
            read_upgraded = report.read_upgraded,
            duplicates = report.duplicates,
            rejected = report.rejected.len(),
            "Inbound notifications reconciled"
        );

        for source in report.rejected {
            warn!(stream = stream.as_str(), error = %source, "Inbound notification rejected");
            metrics::record_rejected(source.reason());
            self.publish(CenterSignal::RecoverableError(CenterError::RejectedRecord {
                stream: stream.as_str(),
                source,
            }));
        }
    }

    /// Send now if connected; otherwise queue in the outbox, or drop it when
    /// the outbox is disabled.
    ///
    /// A send on a ready transport flushes the outbox first, so a reconnect
    /// the driver has not observed yet cannot strand older messages.
    fn deliver_read_state(&self, message: OutboundMessage) {
        let state = self.transport.state();
        if state.is_connected {
            if state.is_ready() {
                self.flush_outbox();
            }
            self.send(message);
            return;
        }

        let kind = message.kind();
        if self.config.outbox_enabled {
            let queued = self.state.lock().outbox.enqueue(message);
            metrics::record_outbound(kind, "queued");
            debug!(kind, coalesced = !queued, "Outbound message queued (transport disconnected)");
        } else {
            metrics::record_outbound(kind, "dropped");
            warn!(kind, "Outbound message dropped (transport disconnected)");
            self.publish(CenterSignal::RecoverableError(
                CenterError::TransportUnavailable { kind },
            ));
        }
    }

    fn send(&self, message: OutboundMessage) {
        let event = message.event_name(&self.config.events);
        let payload = match message.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                metrics::record_outbound(message.kind(), "dropped");
                warn!(event, error = %e, "Outbound message dropped (encoding failed)");
                return;
            }
        };
        self.transport.send(event, payload);
        metrics::record_outbound(message.kind(), "sent");
        debug!(event, kind = message.kind(), "Outbound message sent");
    }

    fn publish_unread(&self, unread: usize) {
        metrics::set_unread(unread);
        self.publish(CenterSignal::UnreadCountChanged { unread });
    }

    fn publish(&self, signal: CenterSignal) {
        // No receivers is fine: signals are optional.
        let _ = self.signals.send(signal);
    }
}
