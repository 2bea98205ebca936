//! Driving Ports (API - Inbound)
//!
//! What the UI layer calls. Every operation completes synchronously and
//! atomically with respect to inbound handlers.

use notify_types::{Notification, NotificationId};

/// Primary notification center API
pub trait NotificationCenterApi: Send + Sync {
    /// Mark one notification read locally and propagate it to the server.
    ///
    /// Idempotent; absent ids are a no-op. Returns `true` if the local flag
    /// flipped.
    fn mark_read(&self, id: &NotificationId) -> bool;

    /// Mark every notification read locally and propagate it to the server.
    ///
    /// Returns how many local flags flipped; `0` on an empty store.
    fn mark_all_read(&self) -> usize;

    /// Number of unread notifications, derived from the store.
    fn unread_count(&self) -> usize;

    /// All notifications, most recent first.
    fn notifications(&self) -> Vec<Notification>;

    /// One notification by id.
    fn get(&self, id: &NotificationId) -> Option<Notification>;

    /// Read-state messages waiting for a reconnect.
    fn pending_outbound(&self) -> usize;
}
