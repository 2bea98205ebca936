//! Driven Ports (SPI - Outbound Dependencies)
//!
//! The transport port lives in `notify-bus` and is re-exported here so the
//! center's collaborators are visible in one place.

use notify_types::NotificationType;

pub use notify_bus::{ConnectionState, EventHandler, Payload, TransportClient, Unsubscribe};

/// Icon shown next to a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Icon {
    Map,
    Camera,
    Comment,
    Heart,
    UserPlus,
    Bell,
}

impl Icon {
    /// Icon-set name used by the rendering layer.
    pub fn name(&self) -> &'static str {
        match self {
            Icon::Map => "map",
            Icon::Camera => "camera",
            Icon::Comment => "message-circle",
            Icon::Heart => "heart",
            Icon::UserPlus => "user-plus",
            Icon::Bell => "bell",
        }
    }
}

/// Maps records to what the UI shows. Consumed by rendering, never by the
/// store or the reconciliation path.
pub trait PresentationAdapter: Send + Sync {
    fn type_to_icon(&self, kind: NotificationType) -> Icon;

    /// Localized "5 minutes ago" style string for an ISO-8601 timestamp.
    fn format_relative_time(&self, iso: &str) -> String;
}
