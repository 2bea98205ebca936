//! Reconciliation Engine
//!
//! Folds the two inbound streams, single live pushes and bulk snapshots,
//! into the [`NotificationStore`]. Each record is validated first, then
//! appended with the store's dedup rule, so either interleaving of the two
//! streams converges to the same ids with read state never regressing.

use super::store::{AppendOutcome, NotificationStore};
use chrono::{DateTime, Utc};
use notify_types::{Notification, RawNotification, SnapshotBatch, ValidationError, ValidationMode};
use serde_json::Value;

/// Which inbound stream a payload came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InboundStream {
    LivePush,
    Snapshot,
}

impl InboundStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            InboundStream::LivePush => "live_push",
            InboundStream::Snapshot => "snapshot",
        }
    }
}

/// Outcome of folding one payload into the store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// New ids added.
    pub inserted: usize,
    /// Existing unread ids replaced by a read copy.
    pub read_upgraded: usize,
    /// Existing ids left untouched.
    pub duplicates: usize,
    /// Records that failed validation, in arrival order.
    pub rejected: Vec<ValidationError>,
}

impl ReconcileReport {
    /// Whether the store's contents changed.
    pub fn changed(&self) -> bool {
        self.inserted > 0 || self.read_upgraded > 0
    }

    /// Records that passed validation.
    pub fn accepted(&self) -> usize {
        self.inserted + self.read_upgraded + self.duplicates
    }

    fn record(&mut self, outcome: AppendOutcome) {
        match outcome {
            AppendOutcome::Inserted => self.inserted += 1,
            AppendOutcome::ReadUpgraded => self.read_upgraded += 1,
            AppendOutcome::Duplicate => self.duplicates += 1,
        }
    }
}

/// Validates inbound payloads and folds them into a store.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reconciler {
    mode: ValidationMode,
}

impl Reconciler {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Fold a single live-push record.
    pub fn fold_live(
        &self,
        store: &mut NotificationStore,
        payload: &Value,
        received_at: DateTime<Utc>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        self.fold_one(store, payload.clone(), received_at, &mut report);
        report
    }

    /// Fold a `{notifications: [...]}` batch in batch order.
    ///
    /// Fails only if the envelope itself is malformed; bad items are
    /// reported individually and the rest of the batch still applies.
    pub fn fold_snapshot(
        &self,
        store: &mut NotificationStore,
        payload: &Value,
        received_at: DateTime<Utc>,
    ) -> Result<ReconcileReport, ValidationError> {
        let batch = SnapshotBatch::from_value(payload.clone())?;
        let mut report = ReconcileReport::default();
        for raw in batch.notifications {
            self.fold_one(store, raw, received_at, &mut report);
        }
        Ok(report)
    }

    /// Fold records that are already validated.
    pub fn fold_records(
        &self,
        store: &mut NotificationStore,
        records: impl IntoIterator<Item = Notification>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        for record in records {
            report.record(store.append(record));
        }
        report
    }

    fn fold_one(
        &self,
        store: &mut NotificationStore,
        raw: Value,
        received_at: DateTime<Utc>,
        report: &mut ReconcileReport,
    ) {
        let validated = RawNotification::from_value(raw)
            .and_then(|raw| raw.validate(self.mode, received_at));

        match validated {
            Ok(record) => report.record(store.append(record)),
            Err(e) => report.rejected.push(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn wire(id: &str, created_at: &str, read: bool) -> Value {
        json!({
            "id": id,
            "type": "photo.comment",
            "title": "New comment",
            "message": "Nice shot",
            "createdAt": created_at,
            "read": read
        })
    }

    fn order(store: &NotificationStore) -> Vec<String> {
        store.iter().map(|n| n.id.to_string()).collect()
    }

    #[test]
    fn test_snapshot_then_live_push_orders_by_recency() {
        let reconciler = Reconciler::default();
        let mut store = NotificationStore::new();

        let batch = json!({ "notifications": [
            wire("A", "2024-03-01T08:00:00Z", false),
            wire("B", "2024-03-01T09:00:00Z", false),
        ]});
        let report = reconciler.fold_snapshot(&mut store, &batch, now()).unwrap();
        assert_eq!(report.inserted, 2);

        reconciler.fold_live(&mut store, &wire("C", "2024-03-01T09:30:00Z", false), now());

        assert_eq!(order(&store), vec!["C", "B", "A"]);
        assert_eq!(store.unread_count(), 3);
    }

    #[test]
    fn test_live_push_then_snapshot_with_same_id_deduplicates() {
        let reconciler = Reconciler::default();
        let mut store = NotificationStore::new();

        reconciler.fold_live(&mut store, &wire("X", "2024-03-01T08:00:00Z", false), now());
        store.mark_read(&"X".into());

        let batch = json!({ "notifications": [wire("X", "2024-03-01T08:00:00Z", false)] });
        let report = reconciler.fold_snapshot(&mut store, &batch, now()).unwrap();

        assert_eq!(report.duplicates, 1);
        assert!(!report.changed());
        assert_eq!(store.len(), 1);
        assert!(store.get(&"X".into()).unwrap().read);
    }

    #[test]
    fn test_snapshot_read_flag_upgrades_local_copy() {
        let reconciler = Reconciler::default();
        let mut store = NotificationStore::new();

        reconciler.fold_live(&mut store, &wire("X", "2024-03-01T08:00:00Z", false), now());
        let batch = json!({ "notifications": [wire("X", "2024-03-01T08:00:00Z", true)] });
        let report = reconciler.fold_snapshot(&mut store, &batch, now()).unwrap();

        assert_eq!(report.read_upgraded, 1);
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn test_bad_items_rejected_rest_applied() {
        let reconciler = Reconciler::new(ValidationMode::Strict);
        let mut store = NotificationStore::new();

        let batch = json!({ "notifications": [
            wire("ok", "2024-03-01T08:00:00Z", false),
            { "type": "photo.like", "title": "t", "message": "m", "createdAt": "2024-03-01T08:00:00Z" },
            "not an object",
        ]});
        let report = reconciler.fold_snapshot(&mut store, &batch, now()).unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0], ValidationError::MissingField("id"));
        assert!(matches!(report.rejected[1], ValidationError::Malformed(_)));
        assert_eq!(report.accepted(), 1);
    }

    #[test]
    fn test_lenient_mode_inserts_untreated_records() {
        let reconciler = Reconciler::new(ValidationMode::Lenient);
        let mut store = NotificationStore::new();

        let report = reconciler.fold_live(&mut store, &json!({ "title": "hello" }), now());

        assert_eq!(report.inserted, 1);
        let record = store.iter().next().unwrap();
        assert_eq!(record.created_at, now());
    }

    #[test]
    fn test_malformed_envelope_is_an_error() {
        let reconciler = Reconciler::default();
        let mut store = NotificationStore::new();

        let result = reconciler.fold_snapshot(&mut store, &json!({ "notifications": 3 }), now());
        assert!(matches!(result, Err(ValidationError::Malformed(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_fold_records_reports_outcomes() {
        let reconciler = Reconciler::default();
        let mut store = NotificationStore::new();
        let record = Notification::new(
            "r",
            notify_types::NotificationType::SystemNotification,
            "t",
            "m",
            now(),
        );

        let report = reconciler.fold_records(&mut store, vec![record.clone(), record]);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.duplicates, 1);
    }
}
