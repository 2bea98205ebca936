//! # Notification Runtime
//!
//! Wires a [`notification_center::NotificationCenter`] to a live WebSocket
//! connection.
//!
//! ## Modular Structure
//!
//! - `adapters/` - WebSocket implementation of the transport port
//! - `telemetry` - tracing subscriber setup
//! - `render` - plain-text list rendering through the presentation adapter

pub mod adapters;
pub mod render;
pub mod telemetry;

pub use adapters::{WsConfig, WsTransport};
pub use render::render_list;
pub use telemetry::{init_logging, LoggingConfig, TelemetryError};
