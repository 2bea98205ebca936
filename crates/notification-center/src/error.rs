//! Error types for the notification center
//!
//! None of these ever propagate to the UI as a failure: they are logged,
//! counted, and published as [`crate::CenterSignal::RecoverableError`].

use notify_types::ValidationError;
use thiserror::Error;

/// Notification center errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CenterError {
    /// An inbound record failed validation and was not stored
    #[error("Rejected {stream} record: {source}")]
    RejectedRecord {
        stream: &'static str,
        source: ValidationError,
    },

    /// A snapshot envelope could not be decoded at all
    #[error("Malformed {stream} payload: {source}")]
    MalformedBatch {
        stream: &'static str,
        source: ValidationError,
    },

    /// An outbound message was dropped because the transport was down and
    /// the outbox is disabled
    #[error("Transport unavailable: dropped outbound {kind}")]
    TransportUnavailable { kind: &'static str },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for notification center operations
pub type CenterResult<T> = Result<T, CenterError>;
