//! # Wire Payloads
//!
//! Every payload exchanged with the backend over the transport channel.
//!
//! ## Design Rules
//!
//! - Outbound payloads are serialized camelCase to match the backend.
//! - Inbound batches keep their items as raw JSON so a single bad item never
//!   drops the rest of the batch.

use crate::entities::{NotificationId, UserId};
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// EVENT CATALOGUE
// =============================================================================

/// Default name of the single-item live-push event.
pub const DEFAULT_LIVE_EVENT: &str = "notification:new";
/// Default name of the batch snapshot event.
pub const DEFAULT_SNAPSHOT_EVENT: &str = "notifications:pending";
/// Default name of the outbound snapshot request.
pub const DEFAULT_SNAPSHOT_REQUEST_EVENT: &str = "notifications:get-pending";
/// Default name of the outbound mark-one-read message.
pub const DEFAULT_MARK_READ_EVENT: &str = "notification:mark-read";
/// Default name of the outbound mark-all-read message.
pub const DEFAULT_MARK_ALL_READ_EVENT: &str = "notifications:mark-all-read";

/// Names of the two inbound and three outbound events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCatalogue {
    /// Inbound: one new notification.
    pub live_push: String,
    /// Inbound: `{notifications: [...]}`.
    pub snapshot: String,
    /// Outbound: `{userId}`.
    pub snapshot_request: String,
    /// Outbound: `{notificationId}`.
    pub mark_read: String,
    /// Outbound: `{userId}`.
    pub mark_all_read: String,
}

impl Default for EventCatalogue {
    fn default() -> Self {
        Self {
            live_push: DEFAULT_LIVE_EVENT.to_string(),
            snapshot: DEFAULT_SNAPSHOT_EVENT.to_string(),
            snapshot_request: DEFAULT_SNAPSHOT_REQUEST_EVENT.to_string(),
            mark_read: DEFAULT_MARK_READ_EVENT.to_string(),
            mark_all_read: DEFAULT_MARK_ALL_READ_EVENT.to_string(),
        }
    }
}

// =============================================================================
// OUTBOUND
// =============================================================================

/// Request for the notifications not yet delivered to this user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRequest {
    pub user_id: UserId,
}

/// Mark a single notification read on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub notification_id: NotificationId,
}

/// Mark every notification of a user read on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadRequest {
    pub user_id: UserId,
}

/// Any message the notification center sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    SnapshotRequest(SnapshotRequest),
    MarkRead(MarkReadRequest),
    MarkAllRead(MarkAllReadRequest),
}

impl OutboundMessage {
    pub fn snapshot_request(user_id: UserId) -> Self {
        OutboundMessage::SnapshotRequest(SnapshotRequest { user_id })
    }

    pub fn mark_read(notification_id: NotificationId) -> Self {
        OutboundMessage::MarkRead(MarkReadRequest { notification_id })
    }

    pub fn mark_all_read(user_id: UserId) -> Self {
        OutboundMessage::MarkAllRead(MarkAllReadRequest { user_id })
    }

    /// Event name this message is sent under.
    pub fn event_name<'a>(&self, events: &'a EventCatalogue) -> &'a str {
        match self {
            OutboundMessage::SnapshotRequest(_) => &events.snapshot_request,
            OutboundMessage::MarkRead(_) => &events.mark_read,
            OutboundMessage::MarkAllRead(_) => &events.mark_all_read,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::SnapshotRequest(_) => "snapshot_request",
            OutboundMessage::MarkRead(_) => "mark_read",
            OutboundMessage::MarkAllRead(_) => "mark_all_read",
        }
    }

    /// JSON payload, serialized from the request struct.
    pub fn to_payload(&self) -> serde_json::Result<Value> {
        match self {
            OutboundMessage::SnapshotRequest(req) => serde_json::to_value(req),
            OutboundMessage::MarkRead(req) => serde_json::to_value(req),
            OutboundMessage::MarkAllRead(req) => serde_json::to_value(req),
        }
    }
}

// =============================================================================
// INBOUND
// =============================================================================

/// Bulk delivery of previously undelivered notifications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotBatch {
    #[serde(default)]
    pub notifications: Vec<Value>,
}

impl SnapshotBatch {
    /// Decode a batch payload. A missing `notifications` key is an empty batch;
    /// anything that is not an object with an array there is malformed.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))
    }
}
