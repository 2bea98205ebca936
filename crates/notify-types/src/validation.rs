//! # Inbound Validation
//!
//! Inbound records are decoded leniently into [`RawNotification`] and then
//! checked field by field. [`ValidationMode::Strict`] rejects non-conforming
//! records; [`ValidationMode::Lenient`] repairs them the way an unvalidated
//! client would have displayed them.

use crate::entities::{Notification, NotificationDetails, NotificationId, NotificationType};
use crate::errors::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// How inbound records that fail validation are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Reject the record.
    #[default]
    Strict,
    /// Substitute a generated id, the receive time, `system.notification`
    /// or empty text for whatever is missing or invalid.
    Lenient,
}

impl std::str::FromStr for ValidationMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidationMode::Strict),
            "lenient" => Ok(ValidationMode::Lenient),
            other => Err(ValidationError::Malformed(format!(
                "unknown validation mode `{other}`"
            ))),
        }
    }
}

/// A notification exactly as it arrived, every field optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNotification {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub read: Option<bool>,
    #[serde(flatten)]
    pub details: NotificationDetails,
}

impl RawNotification {
    /// Decode a JSON value. Fails only when the value is not an object or a
    /// present field has the wrong JSON type.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    /// Turn the raw record into a domain record.
    ///
    /// `received_at` stands in for a missing or unparseable `createdAt` in
    /// lenient mode.
    pub fn validate(
        self,
        mode: ValidationMode,
        received_at: DateTime<Utc>,
    ) -> Result<Notification, ValidationError> {
        let lenient = mode == ValidationMode::Lenient;

        let id = match parse_id(self.id) {
            Ok(id) => id,
            Err(_) if lenient => NotificationId::new(Uuid::new_v4().to_string()),
            Err(e) => return Err(e),
        };

        let kind = match self.kind.as_deref() {
            Some(raw) => match raw.parse::<NotificationType>() {
                Ok(kind) => kind,
                Err(_) if lenient => NotificationType::SystemNotification,
                Err(e) => return Err(e),
            },
            None if lenient => NotificationType::SystemNotification,
            None => return Err(ValidationError::MissingField("type")),
        };

        let created_at = match self.created_at.as_deref() {
            Some(raw) => match parse_timestamp(raw) {
                Ok(ts) => ts,
                Err(_) if lenient => received_at,
                Err(e) => return Err(e),
            },
            None if lenient => received_at,
            None => return Err(ValidationError::MissingField("createdAt")),
        };

        let title = match self.title {
            Some(title) => title,
            None if lenient => String::new(),
            None => return Err(ValidationError::MissingField("title")),
        };

        let message = match self.message {
            Some(message) => message,
            None if lenient => String::new(),
            None => return Err(ValidationError::MissingField("message")),
        };

        Ok(Notification {
            id,
            kind,
            title,
            message,
            created_at,
            read: self.read.unwrap_or(false),
            details: self.details,
        })
    }
}

/// Ids arrive as strings or integers; integers are kept as their decimal form.
fn parse_id(value: Option<Value>) -> Result<NotificationId, ValidationError> {
    match value {
        None => Err(ValidationError::MissingField("id")),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ValidationError::EmptyId),
        Some(Value::String(s)) => Ok(NotificationId(s)),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(NotificationId(n.to_string())),
        Some(other) => Err(ValidationError::InvalidId(json_type_name(&other).to_string())),
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp(raw.to_string()))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap()
    }

    fn valid_json() -> Value {
        json!({
            "id": "n-1",
            "type": "user.followed",
            "title": "New follower",
            "message": "Alex followed you",
            "createdAt": "2024-06-01T08:00:00+02:00",
            "userId": "u-9"
        })
    }

    fn validate(value: Value, mode: ValidationMode) -> Result<Notification, ValidationError> {
        RawNotification::from_value(value)?.validate(mode, now())
    }

    #[test]
    fn test_valid_record_passes_strict() {
        let record = validate(valid_json(), ValidationMode::Strict).unwrap();
        assert_eq!(record.id.as_str(), "n-1");
        assert_eq!(record.kind, NotificationType::UserFollowed);
        assert_eq!(record.created_at, Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap());
        assert!(!record.read);
        assert_eq!(record.details.user_id.as_deref(), Some("u-9"));
    }

    #[test]
    fn test_integer_id_normalised() {
        let mut value = valid_json();
        value["id"] = json!(42);
        let record = validate(value, ValidationMode::Strict).unwrap();
        assert_eq!(record.id.as_str(), "42");
    }

    #[test]
    fn test_strict_rejects_missing_id() {
        let mut value = valid_json();
        value.as_object_mut().unwrap().remove("id");
        assert_eq!(
            validate(value, ValidationMode::Strict),
            Err(ValidationError::MissingField("id"))
        );
    }

    #[test]
    fn test_strict_rejects_empty_and_float_ids() {
        let mut value = valid_json();
        value["id"] = json!("  ");
        assert_eq!(validate(value, ValidationMode::Strict), Err(ValidationError::EmptyId));

        let mut value = valid_json();
        value["id"] = json!(1.5);
        assert_eq!(
            validate(value, ValidationMode::Strict),
            Err(ValidationError::InvalidId("float".into()))
        );
    }

    #[test]
    fn test_strict_rejects_bad_timestamp() {
        let mut value = valid_json();
        value["createdAt"] = json!("yesterday");
        assert_eq!(
            validate(value, ValidationMode::Strict),
            Err(ValidationError::InvalidTimestamp("yesterday".into()))
        );
    }

    #[test]
    fn test_strict_rejects_unknown_type() {
        let mut value = valid_json();
        value["type"] = json!("photo.deleted");
        assert!(matches!(
            validate(value, ValidationMode::Strict),
            Err(ValidationError::UnknownType(_))
        ));
    }

    #[test]
    fn test_lenient_repairs_record() {
        let value = json!({ "title": "Maintenance", "createdAt": "soon", "type": "weird" });
        let record = validate(value, ValidationMode::Lenient).unwrap();

        assert!(Uuid::parse_str(record.id.as_str()).is_ok());
        assert_eq!(record.created_at, now());
        assert_eq!(record.kind, NotificationType::SystemNotification);
        assert_eq!(record.title, "Maintenance");
        assert_eq!(record.message, "");
    }

    #[test]
    fn test_non_object_is_malformed() {
        assert!(matches!(
            RawNotification::from_value(json!([1, 2, 3])),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Lenient".parse::<ValidationMode>().unwrap(), ValidationMode::Lenient);
        assert_eq!("strict".parse::<ValidationMode>().unwrap(), ValidationMode::Strict);
        assert!("loose".parse::<ValidationMode>().is_err());
    }
}
