//! Domain module for the notification center
//!
//! ## Core Modules
//! - store: keyed, ordered, deduplicated notification storage
//! - reconcile: folds live pushes and snapshots into the store
//! - outbox: read-state messages pending a reconnect
//! - connection: level-to-edge detection on transport state

pub mod connection;
pub mod outbox;
pub mod reconcile;
pub mod store;

pub use connection::{ConnectionEdge, EdgeDetector};
pub use outbox::Outbox;
pub use reconcile::{InboundStream, ReconcileReport, Reconciler};
pub use store::{AppendOutcome, NotificationStore};
