//! Transport adapters.

pub mod ws_transport;

pub use ws_transport::{backoff_delay, Frame, TransportError, WsConfig, WsTransport};
