//! Error types for the store layer.

use twovue_protocol::GameId;
use twovue_rules::ValidationError;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The game does not exist.
    #[error("game {0} not found")]
    NotFound(GameId),

    /// The game is in a state that doesn't allow this operation.
    /// For example, joining a game that already has two players.
    #[error("invalid game state for this operation: {0}")]
    InvalidState(String),

    /// Player 2 tried to join under player 1's name.
    #[error("player name {0:?} is already taken in this game")]
    NameTaken(String),

    /// The submitting player is not the one whose turn it is.
    #[error("it is not {0}'s turn")]
    NotYourTurn(String),

    /// Another submission already took this turn slot.
    #[error("stale turn number: expected {expected}, got {actual}")]
    StaleTurnNumber { expected: u32, actual: u32 },

    /// The submitted tags break the turn rules.
    #[error("turn rejected: {0}")]
    Rejected(#[from] ValidationError),

    /// The submission passes the rules but doesn't match what the rules
    /// produce (wrong shared tag, wrong order).
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),

    /// The store's command channel is full or closed.
    #[error("store is unavailable")]
    Unavailable,
}
