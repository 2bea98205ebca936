//! # Error Types
//!
//! Errors raised while turning inbound wire payloads into domain records.

use thiserror::Error;

/// Why an inbound record or batch was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent or `null`.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The `id` field is present but empty.
    #[error("Notification id is empty")]
    EmptyId,

    /// The `id` field is neither a string nor an integer.
    #[error("Notification id has unsupported JSON type: {0}")]
    InvalidId(String),

    /// The `type` field is outside the closed type set.
    #[error("Unknown notification type: {0}")]
    UnknownType(String),

    /// `createdAt` is not an ISO-8601 timestamp.
    #[error("Invalid createdAt timestamp: {0}")]
    InvalidTimestamp(String),

    /// The payload does not have the expected JSON shape at all.
    #[error("Malformed payload: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// Short stable label, used as a metric label and in log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::EmptyId => "empty_id",
            ValidationError::InvalidId(_) => "invalid_id",
            ValidationError::UnknownType(_) => "unknown_type",
            ValidationError::InvalidTimestamp(_) => "invalid_timestamp",
            ValidationError::Malformed(_) => "malformed",
        }
    }
}
