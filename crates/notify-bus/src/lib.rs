//! # Notify Bus - Transport Client Port
//!
//! The notification center never talks to a socket directly. It consumes the
//! [`TransportClient`] port defined here:
//!
//! ```text
//! ┌─────────────────────┐   subscribe(event, handler) -> Unsubscribe
//! │ Notification Center │ ────────────────────────────────────────┐
//! │                     │   send(event, payload)                  ▼
//! │                     │ ──────────────────────────────▶ ┌──────────────────┐
//! │                     │   watch_state()                 │ Transport Client │
//! │                     │ ◀────────────────────────────── │ (ws, in-memory)  │
//! └─────────────────────┘                                 └──────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - Handlers for one event fire in subscription order.
//! - An [`Unsubscribe`] handle releases its handler exactly once, either via
//!   [`Unsubscribe::release`] or on drop.
//! - `send` is fire-and-forget; a disconnected transport drops the frame.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod memory;
pub mod registry;
pub mod state;
pub mod transport;

// Re-export main types
pub use memory::{InMemoryTransport, SentFrame};
pub use registry::HandlerRegistry;
pub use state::ConnectionState;
pub use transport::{EventHandler, Payload, TransportClient, Unsubscribe};
