//! Notification center configuration from environment variables.

use crate::error::{CenterError, CenterResult};
use notify_types::{EventCatalogue, ValidationMode};
use std::env;

/// Default capacity of the signal broadcast channel.
pub const DEFAULT_SIGNAL_CAPACITY: usize = 256;

/// Configuration for a [`crate::NotificationCenter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CenterConfig {
    /// Inbound and outbound event names
    pub events: EventCatalogue,

    /// How non-conforming inbound records are treated
    pub validation: ValidationMode,

    /// Queue read-state messages while disconnected and flush on reconnect.
    /// When false, they are dropped.
    pub outbox_enabled: bool,

    /// Buffered signals per receiver before lagging receivers skip ahead
    pub signal_capacity: usize,
}

impl Default for CenterConfig {
    fn default() -> Self {
        Self {
            events: EventCatalogue::default(),
            validation: ValidationMode::Strict,
            outbox_enabled: true,
            signal_capacity: DEFAULT_SIGNAL_CAPACITY,
        }
    }
}

impl CenterConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NC_VALIDATION`: `strict` or `lenient` (default: strict)
    /// - `NC_OUTBOX`: queue read-state messages while offline (default: true)
    /// - `NC_SIGNAL_CAPACITY`: signal channel capacity (default: 256)
    /// - `NC_EVENT_LIVE`: live-push event name
    /// - `NC_EVENT_SNAPSHOT`: snapshot batch event name
    /// - `NC_EVENT_SNAPSHOT_REQUEST`: snapshot request event name
    /// - `NC_EVENT_MARK_READ`: mark-one-read event name
    /// - `NC_EVENT_MARK_ALL_READ`: mark-all-read event name
    pub fn from_env() -> CenterResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`CenterConfig::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CenterResult<Self> {
        let defaults = Self::default();

        let validation = match lookup("NC_VALIDATION") {
            Some(raw) => raw
                .parse()
                .map_err(|_| CenterError::Config(format!("NC_VALIDATION=`{raw}`")))?,
            None => defaults.validation,
        };

        let outbox_enabled = lookup("NC_OUTBOX")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(defaults.outbox_enabled);

        let signal_capacity = match lookup("NC_SIGNAL_CAPACITY") {
            Some(raw) => raw
                .parse()
                .map_err(|_| CenterError::Config(format!("NC_SIGNAL_CAPACITY=`{raw}`")))?,
            None => defaults.signal_capacity,
        };

        let events = EventCatalogue {
            live_push: lookup("NC_EVENT_LIVE").unwrap_or(defaults.events.live_push),
            snapshot: lookup("NC_EVENT_SNAPSHOT").unwrap_or(defaults.events.snapshot),
            snapshot_request: lookup("NC_EVENT_SNAPSHOT_REQUEST")
                .unwrap_or(defaults.events.snapshot_request),
            mark_read: lookup("NC_EVENT_MARK_READ").unwrap_or(defaults.events.mark_read),
            mark_all_read: lookup("NC_EVENT_MARK_ALL_READ")
                .unwrap_or(defaults.events.mark_all_read),
        };

        let config = Self {
            events,
            validation,
            outbox_enabled,
            signal_capacity,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the center cannot run with.
    pub fn validate(&self) -> CenterResult<()> {
        if self.signal_capacity == 0 {
            return Err(CenterError::Config(
                "signal_capacity must be greater than zero".to_string(),
            ));
        }

        let names = [
            ("live_push", &self.events.live_push),
            ("snapshot", &self.events.snapshot),
            ("snapshot_request", &self.events.snapshot_request),
            ("mark_read", &self.events.mark_read),
            ("mark_all_read", &self.events.mark_all_read),
        ];
        for (field, name) in names {
            if name.trim().is_empty() {
                return Err(CenterError::Config(format!("event name `{field}` is empty")));
            }
        }

        if self.events.live_push == self.events.snapshot {
            return Err(CenterError::Config(
                "live_push and snapshot must be distinct events".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CenterConfig::default();
        assert_eq!(config.validation, ValidationMode::Strict);
        assert!(config.outbox_enabled);
        assert_eq!(config.signal_capacity, DEFAULT_SIGNAL_CAPACITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_lookup_yields_defaults() {
        let config = CenterConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CenterConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = CenterConfig::from_lookup(lookup_from(&[
            ("NC_VALIDATION", "lenient"),
            ("NC_OUTBOX", "0"),
            ("NC_SIGNAL_CAPACITY", "8"),
            ("NC_EVENT_LIVE", "push"),
        ]))
        .unwrap();

        assert_eq!(config.validation, ValidationMode::Lenient);
        assert!(!config.outbox_enabled);
        assert_eq!(config.signal_capacity, 8);
        assert_eq!(config.events.live_push, "push");
        assert_eq!(config.events.snapshot, notify_types::DEFAULT_SNAPSHOT_EVENT);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(CenterConfig::from_lookup(lookup_from(&[("NC_VALIDATION", "loose")])).is_err());
        assert!(CenterConfig::from_lookup(lookup_from(&[("NC_SIGNAL_CAPACITY", "0")])).is_err());
        assert!(CenterConfig::from_lookup(lookup_from(&[("NC_SIGNAL_CAPACITY", "x")])).is_err());
        assert!(CenterConfig::from_lookup(lookup_from(&[("NC_EVENT_MARK_READ", " ")])).is_err());
    }

    #[test]
    fn test_live_and_snapshot_must_differ() {
        let mut config = CenterConfig::default();
        config.events.snapshot = config.events.live_push.clone();
        assert!(matches!(config.validate(), Err(CenterError::Config(_))));
    }
}
