//! # Core Domain Entities
//!
//! The notification record as it is stored and rendered, plus the identifier
//! newtypes used throughout the workspace.

use crate::errors::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable, unique identifier of a notification record.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub String);

impl NotificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NotificationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of the signed-in user the notification center serves.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Closed set of event kinds the backend turns into notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationType {
    #[serde(rename = "district.unlocked")]
    DistrictUnlocked,
    #[serde(rename = "photo.uploaded")]
    PhotoUploaded,
    #[serde(rename = "photo.comment")]
    PhotoComment,
    #[serde(rename = "photo.like")]
    PhotoLike,
    #[serde(rename = "user.followed")]
    UserFollowed,
    #[serde(rename = "system.notification")]
    SystemNotification,
}

impl NotificationType {
    /// Every variant, in wire-catalogue order.
    pub const ALL: [NotificationType; 6] = [
        NotificationType::DistrictUnlocked,
        NotificationType::PhotoUploaded,
        NotificationType::PhotoComment,
        NotificationType::PhotoLike,
        NotificationType::UserFollowed,
        NotificationType::SystemNotification,
    ];

    /// Dotted wire name, e.g. `photo.like`.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::DistrictUnlocked => "district.unlocked",
            NotificationType::PhotoUploaded => "photo.uploaded",
            NotificationType::PhotoComment => "photo.comment",
            NotificationType::PhotoLike => "photo.like",
            NotificationType::UserFollowed => "user.followed",
            NotificationType::SystemNotification => "system.notification",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownType(s.to_string()))
    }
}

/// Optional type-specific fields carried alongside the common record fields.
///
/// Flattened into the record on the wire, so `districtId` sits next to `title`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_avatar: Option<String>,
}

/// One event surfaced to the user; the unit stored and displayed.
///
/// `read` only moves from `false` to `true` within a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(flatten)]
    pub details: NotificationDetails,
}

impl Notification {
    /// Create an unread record with no type-specific details.
    pub fn new(
        id: impl Into<NotificationId>,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            message: message.into(),
            created_at,
            read: false,
            details: NotificationDetails::default(),
        }
    }

    /// Builder-style helper for the `read` flag.
    pub fn with_read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    /// Builder-style helper for type-specific details.
    pub fn with_details(mut self, details: NotificationDetails) -> Self {
        self.details = details;
        self
    }

    pub fn is_unread(&self) -> bool {
        !self.read
    }
}
