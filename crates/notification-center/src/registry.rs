//! Subscription Registry
//!
//! Holds the center's two inbound subscriptions as one scoped resource:
//! acquired on the ready edge, released on the lost edge, on shutdown and on
//! drop. At most one handler per event is active at any time.

use crate::metrics;
use notify_bus::{EventHandler, TransportClient, Unsubscribe};
use notify_types::EventCatalogue;
use tracing::info;

struct ActiveSubscriptions {
    live_push: Unsubscribe,
    snapshot: Unsubscribe,
}

/// The live-push and snapshot subscriptions of one session.
#[derive(Default)]
pub struct SubscriptionRegistry {
    active: Option<ActiveSubscriptions>,
    generation: u64,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe both handlers, releasing any previous pair first.
    pub fn acquire<T>(
        &mut self,
        transport: &T,
        events: &EventCatalogue,
        live_push: EventHandler,
        snapshot: EventHandler,
    ) where
        T: TransportClient + ?Sized,
    {
        self.release();

        let live_push = transport.subscribe(&events.live_push, live_push);
        let snapshot = transport.subscribe(&events.snapshot, snapshot);
        self.active = Some(ActiveSubscriptions {
            live_push,
            snapshot,
        });
        self.generation += 1;
        metrics::record_subscription_acquired();

        info!(
            live_push = %events.live_push,
            snapshot = %events.snapshot,
            generation = self.generation,
            "Notification subscriptions acquired"
        );
    }

    /// Release both subscriptions. Returns `false` if none were active.
    pub fn release(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };

        active.live_push.release();
        active.snapshot.release();
        info!(generation = self.generation, "Notification subscriptions released");
        true
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Number of times a subscription pair has been acquired.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
