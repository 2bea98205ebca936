//! # Notify Types Crate
//!
//! Domain entities and wire payloads for the real-time notification center.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the notification record and every inbound and
//!   outbound payload shape is defined here.
//! - **Validate at the edge**: inbound JSON is decoded into [`RawNotification`]
//!   first and only becomes a [`Notification`] through [`RawNotification::validate`].
//! - **Closed type set**: [`NotificationType`] lists every event kind the
//!   backend produces.

pub mod entities;
pub mod errors;
pub mod validation;
pub mod wire;

pub use entities::*;
pub use errors::*;
pub use validation::{RawNotification, ValidationMode};
pub use wire::*;
