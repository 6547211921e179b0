//! Error types for turn validation.

use serde::{Deserialize, Serialize};

/// Why a candidate turn was rejected.
///
/// Every variant is recoverable: the player edits the selection or
/// retakes the photo. None of them is ever retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ValidationError {
    /// The player picked the wrong number of tags for this turn.
    #[error("expected {expected} selected tags, got {actual}")]
    WrongSelectionCount { expected: usize, actual: usize },

    /// None of the previous turn's tags shows up in the new photo.
    #[error("photo contains none of the previous turn's tags")]
    NoSharedTagDetected,

    /// The player picked the shared tag as one of their new tags.
    #[error("shared tag {0:?} cannot also be a new selection")]
    SharedTagReselected(String),

    /// A selected tag is not in the detected pool. Caller bug: the
    /// selection UI only offers detected tags.
    #[error("selected tag {0:?} was not detected in the photo")]
    NotDetected(String),

    /// The same tag was selected twice. Caller bug: the selection UI
    /// deduplicates.
    #[error("tag {0:?} selected more than once")]
    DuplicateSelection(String),

    /// Turn numbers start at 1.
    #[error("turn numbers start at 1")]
    InvalidTurnNumber,
}

impl ValidationError {
    /// Short text suitable for showing to the player.
    pub fn user_message(&self) -> String {
        match self {
            Self::WrongSelectionCount { expected, .. } => {
                format!("Select exactly {expected} tags")
            }
            Self::NoSharedTagDetected => {
                "No shared object found, retake the photo".to_string()
            }
            Self::SharedTagReselected(tag) => {
                format!("{tag} is already the shared tag, pick another")
            }
            Self::NotDetected(_)
            | Self::DuplicateSelection(_)
            | Self::InvalidTurnNumber => {
                "Selection is out of date, start the turn again".to_string()
            }
        }
    }

    /// Returns `true` for the variants that indicate a caller bug
    /// rather than a rule the player broke.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotDetected(_)
                | Self::DuplicateSelection(_)
                | Self::InvalidTurnNumber
        )
    }
}
