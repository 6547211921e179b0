//! Unified error type for Twovue.

use twovue_protocol::ProtocolError;
use twovue_rules::ValidationError;
use twovue_session::ConflictError;
use twovue_store::StoreError;
use twovue_transport::TransportError;

use crate::DetectionError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `twovue` crate, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant generates a `From` impl, so `?` converts
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TwovueError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, bad game id).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The selected tags break the turn rules.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The cached game disagrees with the store (lost race, wrong game).
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// The store refused or couldn't be reached.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Object detection failed.
    #[error(transparent)]
    Detection(#[from] DetectionError),

    /// The local player tried to act out of turn.
    #[error("it is not {player}'s turn")]
    NotYourTurn { player: String },
}

impl TwovueError {
    /// Returns `true` if another submission took the turn slot first.
    /// The caller's session has already been refreshed.
    pub fn is_stale_turn(&self) -> bool {
        matches!(
            self,
            Self::Conflict(ConflictError::StaleTurnNumber { .. })
                | Self::Store(StoreError::StaleTurnNumber { .. })
        )
    }
}
