//! Connection edge detection
//!
//! The transport publishes levels; the center must act on edges. Re-announcing
//! the same state (a consumer re-render, a duplicate watch notification)
//! produces no edge, so the non-idempotent snapshot request fires once per
//! transition into the ready state.
//!
//! ```text
//! [NOT READY] ──connected && authenticated──→ [READY]     emits Ready
//! [READY]     ──new session number─────────→ [READY]     emits Ready
//! [READY]     ──either flag drops──────────→ [NOT READY] emits Lost
//! ```
//!
//! The second row covers a disconnect and reconnect that happened between
//! two observations.

use notify_bus::ConnectionState;

/// A transition of the ready level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionEdge {
    /// Entered `{connected, authenticated}`.
    Ready,
    /// Left it.
    Lost,
}

/// Turns connection levels into edges.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeDetector {
    ready: bool,
    session: u64,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the latest level; returns an edge only on a change.
    pub fn observe(&mut self, state: ConnectionState) -> Option<ConnectionEdge> {
        match (self.ready, state.is_ready()) {
            (false, true) => {
                self.ready = true;
                self.session = state.session;
                Some(ConnectionEdge::Ready)
            }
            (true, true) if state.session != self.session => {
                self.session = state.session;
                Some(ConnectionEdge::Ready)
            }
            (true, false) => {
                self.ready = false;
                Some(ConnectionEdge::Lost)
            }
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}
