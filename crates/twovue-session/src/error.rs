//! Error types for the session layer.

use twovue_protocol::GameId;

/// Errors raised when a local change conflicts with the cached game.
///
/// All of these mean "your view is out of date": refresh from the
/// store and let the player try again. None is ever re-applied
/// automatically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    /// A turn was presented for a slot that is no longer next.
    /// Usually the other device submitted first.
    #[error("stale turn number: expected {expected}, got {actual}")]
    StaleTurnNumber { expected: u32, actual: u32 },

    /// A second player is already recorded for this game.
    #[error("game already has a second player ({0})")]
    AlreadyJoined(String),

    /// A refresh delivered a different game than the one cached.
    #[error("refresh returned game {actual}, session holds {expected}")]
    GameMismatch { expected: GameId, actual: GameId },
}
