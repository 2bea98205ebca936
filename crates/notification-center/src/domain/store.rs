//! Notification Store
//!
//! Canonical storage is a keyed map (`id -> entry`); the display order is an
//! index derived from it, keyed by `(createdAt desc, arrival asc)`. Duplicate
//! insertion is impossible by construction.
//!
//! INVARIANT: each id appears exactly once.
//! INVARIANT: `read` never moves from `true` back to `false`.

use chrono::{DateTime, Utc};
use notify_types::{Notification, NotificationId};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

/// Position of a record in the display order.
///
/// Newer `created_at` sorts first; ties keep arrival order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OrderKey {
    created_at: Reverse<DateTime<Utc>>,
    arrival: u64,
}

#[derive(Clone, Debug)]
struct StoredEntry {
    record: Notification,
    key: OrderKey,
}

/// What [`NotificationStore::append`] did with a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppendOutcome {
    /// First time this id was seen.
    Inserted,
    /// The id existed unread and the incoming copy is read; the incoming
    /// copy replaced it.
    ReadUpgraded,
    /// The id existed and the stored copy was kept.
    Duplicate,
}

/// Ordered, deduplicated collection of notifications.
#[derive(Clone, Debug, Default)]
pub struct NotificationStore {
    records: HashMap<NotificationId, StoredEntry>,
    order: BTreeMap<OrderKey, NotificationId>,
    next_arrival: u64,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, deduplicating by id.
    ///
    /// On a duplicate the copy with `read = true` wins. If both copies agree
    /// on `read`, the stored copy is kept.
    pub fn append(&mut self, record: Notification) -> AppendOutcome {
        match self.records.get_mut(&record.id) {
            Some(entry) => {
                if !record.read || entry.record.read {
                    return AppendOutcome::Duplicate;
                }

                if record.created_at != entry.record.created_at {
                    self.order.remove(&entry.key);
                    entry.key = OrderKey {
                        created_at: Reverse(record.created_at),
                        arrival: entry.key.arrival,
                    };
                    self.order.insert(entry.key, record.id.clone());
                }
                entry.record = record;
                AppendOutcome::ReadUpgraded
            }
            None => {
                let key = OrderKey {
                    created_at: Reverse(record.created_at),
                    arrival: self.next_arrival,
                };
                self.next_arrival += 1;
                self.order.insert(key, record.id.clone());
                self.records
                    .insert(record.id.clone(), StoredEntry { record, key });
                AppendOutcome::Inserted
            }
        }
    }

    /// Mark one record read. Absent ids and already-read records are no-ops.
    ///
    /// Returns `true` if the flag flipped.
    pub fn mark_read(&mut self, id: &NotificationId) -> bool {
        match self.records.get_mut(id) {
            Some(entry) if !entry.record.read => {
                entry.record.read = true;
                true
            }
            _ => false,
        }
    }

    /// Mark every record read. Returns how many flags flipped.
    pub fn mark_all_read(&mut self) -> usize {
        let mut flipped = 0;
        for entry in self.records.values_mut() {
            if !entry.record.read {
                entry.record.read = true;
                flipped += 1;
            }
        }
        flipped
    }

    /// Number of unread records, derived on every call.
    pub fn unread_count(&self) -> usize {
        self.records
            .values()
            .filter(|entry| !entry.record.read)
            .count()
    }

    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.records.get(id).map(|entry| &entry.record)
    }

    pub fn contains(&self, id: &NotificationId) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.order
            .values()
            .filter_map(|id| self.records.get(id).map(|entry| &entry.record))
    }

    /// Owned copy of the display order.
    pub fn to_vec(&self) -> Vec<Notification> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use notify_types::NotificationType;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn note(id: &str, minutes: i64) -> Notification {
        Notification::new(id, NotificationType::PhotoLike, "title", "message", at(minutes))
    }

    fn ids(store: &NotificationStore) -> Vec<String> {
        store.iter().map(|n| n.id.to_string()).collect()
    }

    // =========================================================================
    // ORDERING
    // =========================================================================

    #[test]
    fn test_descending_recency_regardless_of_arrival() {
        let mut store = NotificationStore::new();
        store.append(note("a", 1));
        store.append(note("c", 3));
        store.append(note("b", 2));

        assert_eq!(ids(&store), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        let mut store = NotificationStore::new();
        store.append(note("first", 5));
        store.append(note("second", 5));
        store.append(note("third", 5));

        assert_eq!(ids(&store), vec!["first", "second", "third"]);
    }

    // =========================================================================
    // DEDUPLICATION
    // =========================================================================

    #[test]
    fn test_duplicate_keeps_stored_copy() {
        let mut store = NotificationStore::new();
        assert_eq!(store.append(note("x", 1)), AppendOutcome::Inserted);

        let mut again = note("x", 9);
        again.title = "changed".into();
        assert_eq!(store.append(again), AppendOutcome::Duplicate);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&"x".into()).unwrap().title, "title");
    }

    #[test]
    fn test_read_copy_never_regresses() {
        let mut store = NotificationStore::new();
        store.append(note("x", 1));
        assert!(store.mark_read(&"x".into()));

        assert_eq!(store.append(note("x", 1)), AppendOutcome::Duplicate);
        assert!(store.get(&"x".into()).unwrap().read);
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn test_incoming_read_copy_upgrades_and_reindexes() {
        let mut store = NotificationStore::new();
        store.append(note("x", 1));
        store.append(note("y", 2));

        let upgraded = note("x", 3).with_read(true);
        assert_eq!(store.append(upgraded), AppendOutcome::ReadUpgraded);

        assert_eq!(ids(&store), vec!["x", "y"]);
        assert_eq!(store.unread_count(), 1);
        assert_eq!(store.len(), 2);
    }

    // =========================================================================
    // READ STATE
    // =========================================================================

    #[test]
    fn test_mark_read_absent_id_is_noop() {
        let mut store = NotificationStore::new();
        store.append(note("x", 1));
        assert!(!store.mark_read(&"missing".into()));
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn test_mark_all_read_on_empty_store() {
        let mut store = NotificationStore::new();
        assert_eq!(store.mark_all_read(), 0);
        assert_eq!(store.unread_count(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_mark_all_read_counts_flips() {
        let mut store = NotificationStore::new();
        store.append(note("a", 1));
        store.append(note("b", 2).with_read(true));
        store.append(note("c", 3));

        assert_eq!(store.mark_all_read(), 2);
        assert_eq!(store.unread_count(), 0);
        assert_eq!(store.mark_all_read(), 0);
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    #[derive(Clone, Debug)]
    enum Op {
        Append { id: u8, minutes: i64, read: bool },
        MarkRead(u8),
        MarkAllRead,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (0u8..12, 0i64..20, any::<bool>())
                .prop_map(|(id, minutes, read)| Op::Append { id, minutes, read }),
            3 => (0u8..14).prop_map(Op::MarkRead),
            1 => Just(Op::MarkAllRead),
        ]
    }

    fn apply(store: &mut NotificationStore, op: &Op) {
        match op {
            Op::Append { id, minutes, read } => {
                store.append(note(&id.to_string(), *minutes).with_read(*read));
            }
            Op::MarkRead(id) => {
                store.mark_read(&id.to_string().into());
            }
            Op::MarkAllRead => {
                store.mark_all_read();
            }
        }
    }

    proptest! {
        #[test]
        fn prop_each_distinct_id_stored_once(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut store = NotificationStore::new();
            let mut appended = HashSet::new();
            for op in &ops {
                apply(&mut store, op);
                if let Op::Append { id, .. } = op {
                    appended.insert(id.to_string());
                }
            }

            let listed = ids(&store);
            let unique: HashSet<_> = listed.iter().cloned().collect();
            prop_assert_eq!(listed.len(), unique.len());
            prop_assert_eq!(unique, appended);
        }

        #[test]
        fn prop_unread_count_matches_records(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut store = NotificationStore::new();
            for op in &ops {
                apply(&mut store, op);
                let expected = store.iter().filter(|n| !n.read).count();
                prop_assert_eq!(store.unread_count(), expected);
            }
        }

        #[test]
        fn prop_order_is_descending(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut store = NotificationStore::new();
            for op in &ops {
                apply(&mut store, op);
            }
            let listed = store.to_vec();
            for pair in listed.windows(2) {
                prop_assert!(pair[0].created_at >= pair[1].created_at);
            }
        }

        #[test]
        fn prop_mark_read_is_idempotent(
            ops in prop::collection::vec(op_strategy(), 0..32),
            target in 0u8..14,
            repeats in 1usize..5,
        ) {
            let mut once = NotificationStore::new();
            for op in &ops {
                apply(&mut once, op);
            }
            let mut many = once.clone();

            once.mark_read(&target.to_string().into());
            for _ in 0..repeats {
                many.mark_read(&target.to_string().into());
            }
            prop_assert_eq!(once.to_vec(), many.to_vec());
        }

        #[test]
        fn prop_read_never_regresses(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut store = NotificationStore::new();
            let mut seen_read = HashSet::new();
            for op in &ops {
                apply(&mut store, op);
                for record in store.iter() {
                    if record.read {
                        seen_read.insert(record.id.to_string());
                    } else {
                        prop_assert!(!seen_read.contains(record.id.as_str()));
                    }
                }
            }
        }
    }
}
