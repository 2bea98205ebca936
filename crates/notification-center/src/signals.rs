//! Signals published to the UI layer
//!
//! The center never fails a call because of a transport or payload problem.
//! Instead it broadcasts what happened; consumers that care subscribe.

use crate::error::CenterError;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

/// Observable change or recoverable failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CenterSignal {
    /// The derived unread count changed.
    UnreadCountChanged { unread: usize },
    /// Something went wrong that the center absorbed.
    RecoverableError(CenterError),
}

/// Stream of signals that skips over anything a slow consumer lagged past.
pub fn signal_stream(
    receiver: broadcast::Receiver<CenterSignal>,
) -> impl Stream<Item = CenterSignal> {
    BroadcastStream::new(receiver).filter_map(|signal| signal.ok())
}
