//! The turn rules.
//!
//! Everything here is a plain function of its arguments: no I/O, no
//! state, no logging. Call it from any task or thread.
//!
//! # The chain
//!
//! ```text
//! turn 1:  [cup, book, pen]              ← 3 picked
//! turn 2:  [book, chair, table]          ← "book" carried, 2 picked
//! turn 3:  [chair, lamp, rug]            ← "chair" carried, 2 picked
//! ```
//!
//! The carried ("shared") tag is never picked by the player. It is the
//! first of the previous turn's tags that the detector also found in
//! the new photo.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Upper bound on the detected pool stored with a turn.
pub const MAX_DETECTED_TAGS: usize = 20;

/// Tags the player picks on the opening turn.
pub const FIRST_TURN_SELECTION: usize = 3;

/// Tags the player picks on every later turn (the shared tag is added
/// automatically).
pub const FOLLOW_UP_SELECTION: usize = 2;

// ---------------------------------------------------------------------------
// CanonicalTurnTags
// ---------------------------------------------------------------------------

/// The validated, order-normalized tags of a turn, ready to store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTurnTags {
    tags: Vec<String>,
    shared_tag: Option<String>,
    detected_tags: Vec<String>,
}

impl CanonicalTurnTags {
    /// Three tags; shared tag first when there is one.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The carried tag. `None` on turn 1.
    pub fn shared_tag(&self) -> Option<&str> {
        self.shared_tag.as_deref()
    }

    /// The full detected pool, stored for later shared-tag lookups.
    pub fn detected_tags(&self) -> &[String] {
        &self.detected_tags
    }

    /// Splits into `(tags, shared_tag, detected_tags)`.
    pub fn into_parts(self) -> (Vec<String>, Option<String>, Vec<String>) {
        (self.tags, self.shared_tag, self.detected_tags)
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// How many tags the player selects on `turn_number`.
pub fn required_selection_count(turn_number: u32) -> usize {
    if turn_number == 1 {
        FIRST_TURN_SELECTION
    } else {
        FOLLOW_UP_SELECTION
    }
}

/// Returns the first tag of `previous_tags`, in order, that also appears
/// in `detected_tags`.
///
/// Earliest position in `previous_tags` wins, so with previous
/// `[a, b]` and both detected the answer is always `a`.
pub fn find_shared_tag<'a, P, D>(
    previous_tags: &'a [P],
    detected_tags: &[D],
) -> Option<&'a str>
where
    P: AsRef<str>,
    D: AsRef<str>,
{
    let detected: HashSet<&str> =
        detected_tags.iter().map(AsRef::as_ref).collect();
    previous_tags
        .iter()
        .map(AsRef::as_ref)
        .find(|tag| detected.contains(tag))
}

/// Validates a candidate turn and builds its canonical tags.
///
/// `previous_tags` is ignored on turn 1.
///
/// # Errors
///
/// Precondition violations are reported before rule violations:
/// [`ValidationError::InvalidTurnNumber`],
/// [`ValidationError::DuplicateSelection`],
/// [`ValidationError::NotDetected`]. Then, for turns after the first,
/// [`ValidationError::NoSharedTagDetected`],
/// [`ValidationError::WrongSelectionCount`] and
/// [`ValidationError::SharedTagReselected`] in that order.
pub fn validate_submission<P, D, S>(
    turn_number: u32,
    previous_tags: &[P],
    detected_tags: &[D],
    selected_tags: &[S],
) -> Result<CanonicalTurnTags, ValidationError>
where
    P: AsRef<str>,
    D: AsRef<str>,
    S: AsRef<str>,
{
    if turn_number == 0 {
        return Err(ValidationError::InvalidTurnNumber);
    }
    check_selection_preconditions(detected_tags, selected_tags)?;

    let detected: Vec<String> =
        detected_tags.iter().map(|t| t.as_ref().to_string()).collect();
    let selected = selected_tags.iter().map(|t| t.as_ref().to_string());

    if turn_number == 1 {
        if selected_tags.len() != FIRST_TURN_SELECTION {
            return Err(ValidationError::WrongSelectionCount {
                expected: FIRST_TURN_SELECTION,
                actual: selected_tags.len(),
            });
        }
        return Ok(CanonicalTurnTags {
            tags: selected.collect(),
            shared_tag: None,
            detected_tags: detected,
        });
    }

    let shared = find_shared_tag(previous_tags, detected_tags)
        .ok_or(ValidationError::NoSharedTagDetected)?;

    if selected_tags.len() != FOLLOW_UP_SELECTION {
        return Err(ValidationError::WrongSelectionCount {
            expected: FOLLOW_UP_SELECTION,
            actual: selected_tags.len(),
        });
    }
    if selected_tags.iter().any(|t| t.as_ref() == shared) {
        return Err(ValidationError::SharedTagReselected(shared.to_string()));
    }

    let mut tags = Vec::with_capacity(FOLLOW_UP_SELECTION + 1);
    tags.push(shared.to_string());
    tags.extend(selected);

    Ok(CanonicalTurnTags {
        tags,
        shared_tag: Some(shared.to_string()),
        detected_tags: detected,
    })
}

/// The detected tags a selection UI should offer on `turn_number`:
/// everything detected except the shared tag (which is filled in
/// automatically).
pub fn selectable_tags<'a, P, D>(
    turn_number: u32,
    previous_tags: &[P],
    detected_tags: &'a [D],
) -> Vec<&'a str>
where
    P: AsRef<str>,
    D: AsRef<str>,
{
    let shared = if turn_number > 1 {
        find_shared_tag(previous_tags, detected_tags)
    } else {
        None
    };
    detected_tags
        .iter()
        .map(AsRef::as_ref)
        .filter(|tag| Some(*tag) != shared)
        .collect()
}

/// Whether a turn can be completed at all from this detected pool:
/// there must be a shared tag (after turn 1) and enough other tags to
/// fill the selection. UIs use this to grey out the submit button and
/// prompt a retake early.
pub fn can_complete_turn<P, D>(
    turn_number: u32,
    previous_tags: &[P],
    detected_tags: &[D],
) -> bool
where
    P: AsRef<str>,
    D: AsRef<str>,
{
    if turn_number == 0 {
        return false;
    }
    if turn_number > 1 && find_shared_tag(previous_tags, detected_tags).is_none() {
        return false;
    }
    selectable_tags(turn_number, previous_tags, detected_tags).len()
        >= required_selection_count(turn_number)
}

fn check_selection_preconditions<D, S>(
    detected_tags: &[D],
    selected_tags: &[S],
) -> Result<(), ValidationError>
where
    D: AsRef<str>,
    S: AsRef<str>,
{
    let detected: HashSet<&str> =
        detected_tags.iter().map(AsRef::as_ref).collect();
    let mut seen = HashSet::with_capacity(selected_tags.len());

    for tag in selected_tags.iter().map(AsRef::as_ref) {
        if !seen.insert(tag) {
            return Err(ValidationError::DuplicateSelection(tag.to_string()));
        }
        if !detected.contains(tag) {
            return Err(ValidationError::NotDetected(tag.to_string()));
        }
    }
    Ok(())
}

// =========================================================================
// Tests
// =========================================================================
