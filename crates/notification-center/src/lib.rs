//! # notification-center
//!
//! Real-time notification delivery and subscription client.
//!
//! ## Overview
//!
//! This crate provides:
//! - **Notification Store**: keyed, deduplicated, ordered by recency
//! - **Reconciliation**: folds live pushes and snapshot batches into the store
//! - **Read-State Sync**: optimistic local mutation, best-effort propagation,
//!   outbox for messages produced while offline
//! - **Subscription Lifecycle**: subscribe and request a snapshot once per
//!   transition into connected+authenticated
//!
//! ## Architecture
//!
//! ```text
//! Transport ──notification:new──────→ ┌────────────────────┐
//!           ──notifications:pending─→ │ Reconciler → Store │ ──unread──→ UI
//!                                     └────────────────────┘
//!           ←─notifications:get-pending── (ready edge)
//!           ←─notification:mark-read ──── mark_read()     ┐
//!           ←─notifications:mark-all-read mark_all_read() ┘ via Outbox when offline
//! ```
//!
//! ## Read-state invariant
//!
//! A record's `read` flag never goes from `true` to `false`: local mutations
//! only set it, and reconciliation keeps whichever copy is read.
//!
//! ## Example
//!
//! ```rust,ignore
//! use notification_center::{CenterConfig, NotificationCenter, NotificationCenterApi};
//!
//! let center = NotificationCenter::new(CenterConfig::default(), user_id, transport)?;
//! tokio::spawn({
//!     let center = center.clone();
//!     async move { center.run().await }
//! });
//!
//! center.mark_read(&id);
//! let badge = center.unread_count();
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod registry;
pub mod service;
pub mod signals;

pub use adapters::DefaultPresentation;
pub use config::{CenterConfig, DEFAULT_SIGNAL_CAPACITY};
pub use domain::{
    AppendOutcome, ConnectionEdge, EdgeDetector, InboundStream, NotificationStore, Outbox,
    ReconcileReport, Reconciler,
};
pub use error::{CenterError, CenterResult};
pub use ports::inbound::NotificationCenterApi;
pub use ports::outbound::{Icon, PresentationAdapter};
pub use registry::SubscriptionRegistry;
pub use service::NotificationCenter;
pub use signals::CenterSignal;
