//! Connection lifecycle state.
//!
//! ```text
//! NotEstablished --open--> Established --close + grace--> Lost --open--> Restored
//!                                                          ^                |
//!                                                          +--close + grace-+
//! ```
//!
//! There is no terminal state: the channel keeps trying to get back to a
//! connected state for as long as it is asked to stay connected.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Lifecycle state of a connection channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    /// No socket has been opened successfully yet.
    #[default]
    NotEstablished,
    /// First successful open.
    Established,
    /// The socket closed and stayed closed past the liveness check.
    Lost,
    /// A socket opened again after the connection was lost.
    Restored,
}

impl ConnectionState {
    /// `Established` and `Restored` both count as connected.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Established | ConnectionState::Restored)
    }

    /// The state a successful open leads to, if the open changes the state.
    ///
    /// Re-opening while still connected (before the liveness check noticed
    /// the close) leaves the state untouched.
    pub fn after_open(&self) -> Option<ConnectionState> {
        match self {
            ConnectionState::NotEstablished => Some(ConnectionState::Established),
            ConnectionState::Lost => Some(ConnectionState::Restored),
            ConnectionState::Established | ConnectionState::Restored => None,
        }
    }
}

impl StateMachine for ConnectionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConnectionState::*;
        matches!(
            (self, target),
            (NotEstablished, Established)
                | (Established, Lost)
                | (Restored, Lost)
                | (Lost, Restored)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionState::*;
        match self {
            NotEstablished => vec![Established],
            Established => vec![Lost],
            Lost => vec![Restored],
            Restored => vec![Lost],
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionState::NotEstablished => "NOT_ESTABLISHED",
            ConnectionState::Established => "ESTABLISHED",
            ConnectionState::Lost => "LOST",
            ConnectionState::Restored => "RESTORED",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ConnectionState; 4] = [
        ConnectionState::NotEstablished,
        ConnectionState::Established,
        ConnectionState::Lost,
        ConnectionState::Restored,
    ];

    #[test]
    fn starts_not_established() {
        assert_eq!(ConnectionState::default(), ConnectionState::NotEstablished);
    }

    #[test]
    fn established_and_restored_are_connected() {
        assert!(ConnectionState::Established.is_connected());
        assert!(ConnectionState::Restored.is_connected());
        assert!(!ConnectionState::NotEstablished.is_connected());
        assert!(!ConnectionState::Lost.is_connected());
    }

    #[test]
    fn open_from_lost_restores() {
        assert_eq!(
            ConnectionState::Lost.after_open(),
            Some(ConnectionState::Restored)
        );
        assert_eq!(
            ConnectionState::NotEstablished.after_open(),
            Some(ConnectionState::Established)
        );
        assert_eq!(ConnectionState::Established.after_open(), None);
    }

    #[test]
    fn cannot_skip_straight_to_lost() {
        assert!(ConnectionState::NotEstablished
            .transition_to(ConnectionState::Lost)
            .is_err());
        assert!(ConnectionState::Lost
            .transition_to(ConnectionState::Established)
            .is_err());
    }

    #[test]
    fn no_state_is_terminal() {
        for state in ALL {
            assert!(!state.is_terminal(), "{state} should not be terminal");
        }
    }

    #[test]
    fn after_open_agrees_with_transition_table() {
        for state in ALL {
            if let Some(next) = state.after_open() {
                assert!(state.can_transition_to(&next));
            }
        }
    }
}
