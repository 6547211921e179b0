//! Turn rules for Twovue.
//!
//! A game is a chain of photos. Each turn names three tags; every turn
//! after the first must carry one tag over from the turn before. This
//! crate decides whether a candidate turn follows that rule and, if so,
//! produces the tags to store.
//!
//! # Key items
//!
//! - [`validate_submission`] - the single entry point for a candidate turn
//! - [`find_shared_tag`] - which previous tag carries over
//! - [`required_selection_count`] - how many tags the player picks
//! - [`CanonicalTurnTags`] - the validated result
//! - [`ValidationError`] - every way a turn can be rejected
//!
//! The crate is pure: no I/O, no state, no async.

mod engine;
mod error;

pub use engine::{
    CanonicalTurnTags, FIRST_TURN_SELECTION, FOLLOW_UP_SELECTION,
    MAX_DETECTED_TAGS,
    can_complete_turn, find_shared_tag, required_selection_count,
    selectable_tags, validate_submission,
};
pub use error::ValidationError;
