//! Ports module for the notification center

pub mod inbound;
pub mod outbound;

pub use inbound::NotificationCenterApi;
pub use outbound::{Icon, PresentationAdapter, TransportClient};
