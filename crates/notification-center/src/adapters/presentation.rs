//! English presentation adapter.

use crate::ports::outbound::{Icon, PresentationAdapter};
use chrono::{DateTime, Utc};
use notify_types::NotificationType;

/// Icon mapping and English relative times.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPresentation;

impl DefaultPresentation {
    pub fn new() -> Self {
        Self
    }

    /// Relative time of `iso` as seen at `now`.
    ///
    /// Unparseable input is returned unchanged; timestamps in the future
    /// render as "just now".
    pub fn format_relative_time_at(&self, iso: &str, now: DateTime<Utc>) -> String {
        let Ok(created) = DateTime::parse_from_rfc3339(iso) else {
            return iso.to_string();
        };
        let created = created.with_timezone(&Utc);
        let elapsed = now.signed_duration_since(created);

        let minutes = elapsed.num_minutes();
        let hours = elapsed.num_hours();
        let days = elapsed.num_days();

        if minutes < 1 {
            "just now".to_string()
        } else if hours < 1 {
            plural(minutes, "minute")
        } else if days < 1 {
            plural(hours, "hour")
        } else if days == 1 {
            "yesterday".to_string()
        } else if days < 7 {
            plural(days, "day")
        } else {
            created.format("%b %-d, %Y").to_string()
        }
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

impl PresentationAdapter for DefaultPresentation {
    fn type_to_icon(&self, kind: NotificationType) -> Icon {
        match kind {
            NotificationType::DistrictUnlocked => Icon::Map,
            NotificationType::PhotoUploaded => Icon::Camera,
            NotificationType::PhotoComment => Icon::Comment,
            NotificationType::PhotoLike => Icon::Heart,
            NotificationType::UserFollowed => Icon::UserPlus,
            NotificationType::SystemNotification => Icon::Bell,
        }
    }

    fn format_relative_time(&self, iso: &str) -> String {
        self.format_relative_time_at(iso, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_relative_time_buckets() {
        let p = DefaultPresentation::new();
        assert_eq!(p.format_relative_time_at("2024-07-15T11:59:30Z", now()), "just now");
        assert_eq!(p.format_relative_time_at("2024-07-15T11:59:00Z", now()), "1 minute ago");
        assert_eq!(p.format_relative_time_at("2024-07-15T11:15:00Z", now()), "45 minutes ago");
        assert_eq!(p.format_relative_time_at("2024-07-15T09:00:00Z", now()), "3 hours ago");
        assert_eq!(p.format_relative_time_at("2024-07-14T10:00:00Z", now()), "yesterday");
        assert_eq!(p.format_relative_time_at("2024-07-11T12:00:00Z", now()), "4 days ago");
        assert_eq!(p.format_relative_time_at("2024-06-02T08:00:00Z", now()), "Jun 2, 2024");
    }

    #[test]
    fn test_future_and_garbage_timestamps() {
        let p = DefaultPresentation::new();
        assert_eq!(p.format_relative_time_at("2024-07-15T13:00:00Z", now()), "just now");
        assert_eq!(p.format_relative_time_at("not a date", now()), "not a date");
    }

    #[test]
    fn test_offsets_are_normalised() {
        let p = DefaultPresentation::new();
        assert_eq!(
            p.format_relative_time_at("2024-07-15T13:30:00+02:00", now()),
            "30 minutes ago"
        );
    }

    #[test]
    fn test_every_type_has_an_icon() {
        let p = DefaultPresentation::new();
        assert_eq!(p.type_to_icon(NotificationType::PhotoLike), Icon::Heart);
        assert_eq!(p.type_to_icon(NotificationType::SystemNotification).name(), "bell");
        for kind in NotificationType::ALL {
            assert!(!p.type_to_icon(kind).name().is_empty());
        }
    }
}
