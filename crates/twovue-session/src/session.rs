//! Session state machine.
//!
//! From the client's point of view a game has exactly one transition:
//!
//! ```text
//!   AwaitingPlayer2 ──(player 2 joins)──→ InProgress
//! ```
//!
//! There is no terminal state. Games continue turn by turn for as long
//! as the players keep playing; anything that ends a game (a turn cap,
//! an explicit "end game" action) is layered on top by the caller.

/// Where a cached game is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Only player 1 is recorded. The game id is being shared.
    AwaitingPlayer2,

    /// Both players are recorded; turns alternate.
    InProgress,
}

impl SessionState {
    /// Returns `true` if a second player may still join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::AwaitingPlayer2)
    }

    /// Returns the state reached by the only forward transition, or
    /// `None` from `InProgress`.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::AwaitingPlayer2 => Some(Self::InProgress),
            Self::InProgress => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingPlayer2 => write!(f, "AwaitingPlayer2"),
            Self::InProgress => write!(f, "InProgress"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_next_single_edge() {
        assert_eq!(
            SessionState::AwaitingPlayer2.next(),
            Some(SessionState::InProgress)
        );
        assert_eq!(SessionState::InProgress.next(), None);
    }

    #[test]
    fn test_session_state_can_transition_to() {
        assert!(SessionState::AwaitingPlayer2
            .can_transition_to(SessionState::InProgress));
        assert!(!SessionState::InProgress
            .can_transition_to(SessionState::AwaitingPlayer2));
        assert!(!SessionState::InProgress
            .can_transition_to(SessionState::InProgress));
    }

    #[test]
    fn test_session_state_is_joinable() {
        assert!(SessionState::AwaitingPlayer2.is_joinable());
        assert!(!SessionState::InProgress.is_joinable());
    }

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::AwaitingPlayer2.to_string(), "AwaitingPlayer2");
        assert_eq!(SessionState::InProgress.to_string(), "InProgress");
    }
}
