//! # Connection State
//!
//! The level-triggered state every transport publishes.
//!
//! `session` numbers each successful handshake. A watcher that misses a
//! short disconnect still sees the new session number, so a reconnect is
//! never merged away into an unchanged level.

use serde::{Deserialize, Serialize};

/// Snapshot of the transport's connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionState {
    pub is_connected: bool,
    pub is_authenticated: bool,
    /// Handshake counter, bumped by the transport each time it becomes
    /// ready. Zero means no session has been established.
    #[serde(default)]
    pub session: u64,
}

impl ConnectionState {
    pub const DISCONNECTED: ConnectionState = ConnectionState {
        is_connected: false,
        is_authenticated: false,
        session: 0,
    };

    pub const CONNECTED: ConnectionState = ConnectionState {
        is_connected: true,
        is_authenticated: false,
        session: 0,
    };

    pub const READY: ConnectionState = ConnectionState {
        is_connected: true,
        is_authenticated: true,
        session: 0,
    };

    /// Ready state for handshake number `session`.
    pub fn ready(session: u64) -> Self {
        Self {
            session,
            ..Self::READY
        }
    }

    /// Connected and authenticated: the only state in which the center
    /// subscribes and requests a snapshot.
    pub fn is_ready(&self) -> bool {
        self.is_connected && self.is_authenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_requires_both_flags() {
        assert!(!ConnectionState::DISCONNECTED.is_ready());
        assert!(!ConnectionState::CONNECTED.is_ready());
        assert!(ConnectionState::READY.is_ready());
        assert!(!ConnectionState {
            is_connected: false,
            is_authenticated: true,
            session: 3,
        }
        .is_ready());
        assert!(ConnectionState::ready(3).is_ready());
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(ConnectionState::READY).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "isConnected": true, "isAuthenticated": true, "session": 0 })
        );
    }

    #[test]
    fn test_session_defaults_when_absent() {
        let state: ConnectionState =
            serde_json::from_value(serde_json::json!({ "isConnected": true, "isAuthenticated": true }))
                .unwrap();
        assert_eq!(state, ConnectionState::READY);
        assert_ne!(state, ConnectionState::ready(1));
    }
}
