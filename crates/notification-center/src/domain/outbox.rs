//! Outbox for read-state mutations made while disconnected
//!
//! Pending messages are kept in order and flushed on the next
//! connect+authenticate edge. Coalescing keeps the queue minimal:
//!
//! - a mark-one for an id already queued is skipped
//! - a mark-all drops every queued mark-one and any earlier mark-all

use notify_types::OutboundMessage;
use std::collections::VecDeque;

/// Ordered queue of pending outbound read-state messages.
#[derive(Clone, Debug, Default)]
pub struct Outbox {
    pending: VecDeque<OutboundMessage>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message. Returns `false` if an equivalent message was
    /// already pending.
    pub fn enqueue(&mut self, message: OutboundMessage) -> bool {
        match &message {
            OutboundMessage::MarkRead(req) => {
                let already_covered = self.pending.iter().any(|pending| match pending {
                    OutboundMessage::MarkRead(queued) => {
                        queued.notification_id == req.notification_id
                    }
                    OutboundMessage::MarkAllRead(_) => false,
                    OutboundMessage::SnapshotRequest(_) => false,
                });
                if already_covered {
                    return false;
                }
            }
            OutboundMessage::MarkAllRead(_) => {
                self.pending.retain(|pending| {
                    !matches!(
                        pending,
                        OutboundMessage::MarkRead(_) | OutboundMessage::MarkAllRead(_)
                    )
                });
            }
            OutboundMessage::SnapshotRequest(_) => {
                // Sent on every ready edge instead.
                return false;
            }
        }

        self.pending.push_back(message);
        true
    }

    /// Take every pending message, oldest first.
    pub fn drain(&mut self) -> Vec<OutboundMessage> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutboundMessage> {
        self.pending.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify_types::{NotificationId, UserId};

    fn mark(id: &str) -> OutboundMessage {
        OutboundMessage::mark_read(NotificationId::new(id))
    }

    fn mark_all() -> OutboundMessage {
        OutboundMessage::mark_all_read(UserId::new("u"))
    }

    #[test]
    fn test_preserves_order() {
        let mut outbox = Outbox::new();
        assert!(outbox.enqueue(mark("a")));
        assert!(outbox.enqueue(mark("b")));

        assert_eq!(outbox.drain(), vec![mark("a"), mark("b")]);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_duplicate_mark_read_skipped() {
        let mut outbox = Outbox::new();
        outbox.enqueue(mark("a"));
        assert!(!outbox.enqueue(mark("a")));
        assert_eq!(outbox.len(), 1);
    }

    #[test]
    fn test_mark_all_supersedes_earlier_messages() {
        let mut outbox = Outbox::new();
        outbox.enqueue(mark("a"));
        outbox.enqueue(mark_all());
        outbox.enqueue(mark("b"));
        outbox.enqueue(mark_all());

        assert_eq!(outbox.drain(), vec![mark_all()]);
    }

    #[test]
    fn test_mark_read_after_mark_all_is_kept() {
        let mut outbox = Outbox::new();
        outbox.enqueue(mark_all());
        assert!(outbox.enqueue(mark("late")));

        let queued: Vec<_> = outbox.iter().cloned().collect();
        assert_eq!(queued, vec![mark_all(), mark("late")]);
    }

    #[test]
    fn test_snapshot_requests_never_queued() {
        let mut outbox = Outbox::new();
        assert!(!outbox.enqueue(OutboundMessage::snapshot_request(UserId::new("u"))));
        assert!(outbox.is_empty());
    }
}
