//! # Notification Center Metrics
//!
//! Prometheus metrics for monitoring delivery and read-state sync.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! notification-center = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `notifications_received_total` - Records received (by stream)
//! - `notifications_rejected_total` - Records rejected by validation (by reason)
//! - `notifications_duplicates_total` - Records whose id was already stored
//! - `notifications_read_upgrades_total` - Stored records upgraded to read by an inbound copy
//! - `notifications_outbound_total` - Outbound messages (by kind and outcome)
//! - `notifications_subscriptions_acquired_total` - Subscription pairs acquired
//! - `notifications_unread` - Gauge of the current unread count

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter,
    IntCounterVec, IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Records received, labeled by stream
    pub static ref NOTIFICATIONS_RECEIVED: IntCounterVec = register_int_counter_vec!(
        "notifications_received_total",
        "Total number of notification records received",
        &["stream"]
    )
    .expect("Failed to create NOTIFICATIONS_RECEIVED metric");

    /// Records rejected, labeled by reason
    pub static ref NOTIFICATIONS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "notifications_rejected_total",
        "Total number of notification records rejected by validation",
        &["reason"]
    )
    .expect("Failed to create NOTIFICATIONS_REJECTED metric");

    /// Records whose id was already stored
    pub static ref NOTIFICATIONS_DUPLICATES: IntCounter = register_int_counter!(
        "notifications_duplicates_total",
        "Total number of inbound records deduplicated by id"
    )
    .expect("Failed to create NOTIFICATIONS_DUPLICATES metric");

    /// Stored unread records replaced by a read copy
    pub static ref NOTIFICATIONS_READ_UPGRADES: IntCounter = register_int_counter!(
        "notifications_read_upgrades_total",
        "Total number of stored records upgraded to read by an inbound copy"
    )
    .expect("Failed to create NOTIFICATIONS_READ_UPGRADES metric");

    /// Outbound messages, labeled by kind and outcome (sent, queued, dropped)
    pub static ref OUTBOUND_MESSAGES: IntCounterVec = register_int_counter_vec!(
        "notifications_outbound_total",
        "Total number of outbound messages by kind and outcome",
        &["kind", "outcome"]
    )
    .expect("Failed to create OUTBOUND_MESSAGES metric");

    /// Subscription pairs acquired
    pub static ref SUBSCRIPTIONS_ACQUIRED: IntCounter = register_int_counter!(
        "notifications_subscriptions_acquired_total",
        "Total number of live-push/snapshot subscription pairs acquired"
    )
    .expect("Failed to create SUBSCRIPTIONS_ACQUIRED metric");

    /// Current unread count
    pub static ref UNREAD: IntGauge = register_int_gauge!(
        "notifications_unread",
        "Current number of unread notifications"
    )
    .expect("Failed to create UNREAD metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record records received on a stream
#[cfg(feature = "metrics")]
pub fn record_received(stream: &str, count: usize) {
    NOTIFICATIONS_RECEIVED
        .with_label_values(&[stream])
        .inc_by(count as u64);
}

/// Record a rejected record with reason
#[cfg(feature = "metrics")]
pub fn record_rejected(reason: &str) {
    NOTIFICATIONS_REJECTED.with_label_values(&[reason]).inc();
}

/// Record dedup outcomes of one reconciliation
#[cfg(feature = "metrics")]
pub fn record_merges(duplicates: usize, read_upgrades: usize) {
    NOTIFICATIONS_DUPLICATES.inc_by(duplicates as u64);
    NOTIFICATIONS_READ_UPGRADES.inc_by(read_upgrades as u64);
}

/// Record an outbound message outcome
#[cfg(feature = "metrics")]
pub fn record_outbound(kind: &str, outcome: &str) {
    OUTBOUND_MESSAGES.with_label_values(&[kind, outcome]).inc();
}

/// Record a subscription pair acquired
#[cfg(feature = "metrics")]
pub fn record_subscription_acquired() {
    SUBSCRIPTIONS_ACQUIRED.inc();
}

/// Update the unread gauge
#[cfg(feature = "metrics")]
pub fn set_unread(unread: usize) {
    UNREAD.set(unread as i64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_received(_stream: &str, _count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_merges(_duplicates: usize, _read_upgrades: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_outbound(_kind: &str, _outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_subscription_acquired() {}

#[cfg(not(feature = "metrics"))]
pub fn set_unread(_unread: usize) {}
