//! The game session: one game's cached turn history.
//!
//! A `GameSession` is what the presentation layer asks "is it my turn?"
//! and "what must the next photo contain?". It owns a copy of the game
//! as last fetched from the store and answers every question from that
//! copy.
//!
//! # Source of truth
//!
//! The session is a cache. The authoritative store may have moved on
//! (the other player's device submitted a turn), so:
//!
//! - [`GameSession::refresh`] overwrites the cache with a fresher fetch;
//! - [`GameSession::append_turn`] is optimistic and rejects a turn whose
//!   number is no longer next with [`ConflictError::StaleTurnNumber`].
//!
//! A stale submission is never silently re-applied. The caller
//! refreshes and tells the player.
//!
//! # Concurrency note
//!
//! `GameSession` is a plain value: mutation takes `&mut self`. Sharing
//! one across tasks means wrapping it at a higher level. Cross-device
//! serialization of turns is the store's job, not the session's.

use twovue_protocol::{Game, GameId, Turn, TurnSubmission, unix_millis};
use twovue_rules::{CanonicalTurnTags, ValidationError};

use crate::{ConflictError, SessionState};

/// One game's cached history plus the turn bookkeeping derived from it.
///
/// ## Lifecycle
///
/// ```text
/// new(game) ──→ join() ──→ validate() ──→ append_turn() ──→ ...
///     │                                        │
///     └────────────── refresh(fetched) ←───────┘ (on conflict)
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    game: Game,
}

impl GameSession {
    /// Wraps a game fetched from the store.
    pub fn new(game: Game) -> Self {
        Self { game }
    }

    /// The cached game.
    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_id(&self) -> &GameId {
        &self.game.id
    }

    /// Turns in order, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.game.turns
    }

    /// Consumes the session, returning the cached game.
    pub fn into_game(self) -> Game {
        self.game
    }

    /// Derived from player presence: no second player means the game is
    /// still waiting.
    pub fn state(&self) -> SessionState {
        if self.game.player2_name.is_some() {
            SessionState::InProgress
        } else {
            SessionState::AwaitingPlayer2
        }
    }

    /// The number the next turn will carry: existing turns + 1.
    pub fn current_turn_number(&self) -> u32 {
        self.game.next_turn_number()
    }

    /// Returns `true` if `player_name` should act now.
    ///
    /// Player 1 acts on an even count of existing turns, player 2 on an
    /// odd count. A name matching neither recorded player (a spectator)
    /// is never on turn.
    pub fn is_my_turn(&self, player_name: &str) -> bool {
        let is_p1 = self.game.player1_name == player_name;
        let is_p2 = self.game.player2_name.as_deref() == Some(player_name);
        let even = self.game.turns.len() % 2 == 0;

        (is_p1 && even) || (is_p2 && !even)
    }

    /// Name of the player who should act now, if that player is known.
    pub fn whose_turn(&self) -> Option<&str> {
        self.game.expected_author()
    }

    /// Tags of the last turn, or empty before the first turn.
    pub fn previous_tags(&self) -> &[String] {
        self.game
            .last_turn()
            .map(|t| t.tags.as_slice())
            .unwrap_or(&[])
    }

    /// How many tags the player picks for the current turn.
    pub fn required_selection_count(&self) -> usize {
        twovue_rules::required_selection_count(self.current_turn_number())
    }

    /// The tags a selection UI should offer for the current turn.
    pub fn selectable_tags<'a, D: AsRef<str>>(
        &self,
        detected_tags: &'a [D],
    ) -> Vec<&'a str> {
        twovue_rules::selectable_tags(
            self.current_turn_number(),
            self.previous_tags(),
            detected_tags,
        )
    }

    /// The tag the current turn would carry over given this detection,
    /// if any. Always `None` on turn 1.
    pub fn shared_tag_for<D: AsRef<str>>(&self, detected_tags: &[D]) -> Option<&str> {
        if self.current_turn_number() == 1 {
            return None;
        }
        twovue_rules::find_shared_tag(self.previous_tags(), detected_tags)
    }

    /// Runs the turn rules for the current turn against the cached
    /// previous turn.
    ///
    /// # Errors
    /// Any [`ValidationError`] from
    /// [`validate_submission`](twovue_rules::validate_submission).
    pub fn validate<D, S>(
        &self,
        detected_tags: &[D],
        selected_tags: &[S],
    ) -> Result<CanonicalTurnTags, ValidationError>
    where
        D: AsRef<str>,
        S: AsRef<str>,
    {
        twovue_rules::validate_submission(
            self.current_turn_number(),
            self.previous_tags(),
            detected_tags,
            selected_tags,
        )
    }

    /// Builds the store payload for a validated turn in the current slot.
    pub fn submission(
        &self,
        candidate: &CanonicalTurnTags,
        author: &str,
        photo_ref: &str,
    ) -> TurnSubmission {
        TurnSubmission {
            player_name: author.to_string(),
            photo_ref: photo_ref.to_string(),
            turn_number: self.current_turn_number(),
            tags: candidate.tags().to_vec(),
            shared_tag: candidate.shared_tag().map(str::to_string),
            detected_tags: candidate.detected_tags().to_vec(),
        }
    }

    /// Appends a validated turn to the cached history.
    ///
    /// `turn_number` is the slot the caller validated against. If the
    /// cache has moved on since (a refresh brought in the other
    /// player's turn), the append is refused.
    ///
    /// # Errors
    /// [`ConflictError::StaleTurnNumber`] if `turn_number` is not
    /// [`current_turn_number`](Self::current_turn_number).
    pub fn append_turn(
        &mut self,
        candidate: CanonicalTurnTags,
        author: &str,
        photo_ref: &str,
        turn_number: u32,
    ) -> Result<&Turn, ConflictError> {
        self.check_slot(turn_number)?;

        let (tags, shared_tag, detected_tags) = candidate.into_parts();
        Ok(self.push_turn(Turn {
            turn_number,
            player_name: author.to_string(),
            photo_ref: photo_ref.to_string(),
            tags,
            shared_tag,
            detected_tags,
            created_at_ms: unix_millis(),
        }))
    }

    /// Appends a turn exactly as the store accepted it, timestamps
    /// included, so the cache matches the authoritative copy.
    ///
    /// # Errors
    /// [`ConflictError::StaleTurnNumber`] if `turn.turn_number` is not
    /// [`current_turn_number`](Self::current_turn_number).
    pub fn record_accepted(&mut self, turn: Turn) -> Result<&Turn, ConflictError> {
        self.check_slot(turn.turn_number)?;
        Ok(self.push_turn(turn))
    }

    fn check_slot(&self, turn_number: u32) -> Result<(), ConflictError> {
        let expected = self.current_turn_number();
        if turn_number != expected {
            tracing::debug!(
                game_id = %self.game.id,
                expected,
                actual = turn_number,
                "stale turn rejected"
            );
            return Err(ConflictError::StaleTurnNumber {
                expected,
                actual: turn_number,
            });
        }
        Ok(())
    }

    fn push_turn(&mut self, turn: Turn) -> &Turn {
        tracing::debug!(
            game_id = %self.game.id,
            turn_number = turn.turn_number,
            player = %turn.player_name,
            "turn appended"
        );
        self.game.updated_at_ms = turn.created_at_ms;
        let index = self.game.turns.len();
        self.game.turns.push(turn);
        &self.game.turns[index]
    }

    /// Records the second player locally, moving the session to
    /// [`SessionState::InProgress`].
    ///
    /// # Errors
    /// [`ConflictError::AlreadyJoined`] if a second player is recorded.
    pub fn join(&mut self, player2_name: &str) -> Result<(), ConflictError> {
        if let Some(existing) = &self.game.player2_name {
            return Err(ConflictError::AlreadyJoined(existing.clone()));
        }
        self.game.player2_name = Some(player2_name.to_string());
        self.game.status = twovue_protocol::GameStatus::InProgress;
        self.game.updated_at_ms = unix_millis();
        tracing::debug!(game_id = %self.game.id, player = %player2_name, "player 2 joined");
        Ok(())
    }

    /// Replaces the cache with a fresher fetch of the same game.
    ///
    /// The store is the source of truth, so the fetched copy wins even
    /// if it has fewer turns than the cache.
    ///
    /// # Errors
    /// [`ConflictError::GameMismatch`] if `game` is a different game.
    pub fn refresh(&mut self, game: Game) -> Result<(), ConflictError> {
        if game.id != self.game.id {
            return Err(ConflictError::GameMismatch {
                expected: self.game.id.clone(),
                actual: game.id,
            });
        }
        tracing::debug!(
            game_id = %game.id,
            turns = game.turns.len(),
            "session refreshed"
        );
        self.game = game;
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `GameSession`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.

    use super::*;

    // -- Helpers ----------------------------------------------------------

    fn gid(s: &str) -> GameId {
        GameId::parse(s).unwrap()
    }

    /// A game between "ada" (player 1) and "bob" (player 2), no turns.
    fn started() -> GameSession {
        let mut game = Game::new(gid("cosmic-probe-one"), "ada", 0);
        game.player2_name = Some("bob".into());
        game.status = twovue_protocol::GameStatus::InProgress;
        GameSession::new(game)
    }

    /// Plays the opening turn: ada picks cup, book, pen.
    fn after_first_turn() -> GameSession {
        let mut session = started();
        let tags = session
            .validate(&["cup", "book", "pen", "lamp"], &["cup", "book", "pen"])
            .unwrap();
        session.append_turn(tags, "ada", "file://1.jpg", 1).unwrap();
        session
    }

    // =====================================================================
    // current_turn_number() / previous_tags()
    // =====================================================================

    #[test]
    fn test_current_turn_number_starts_at_one() {
        let session = started();
        assert_eq!(session.current_turn_number(), 1);
        assert!(session.previous_tags().is_empty());
    }

    #[test]
    fn test_append_turn_advances_turn_number() {
        let session = after_first_turn();
        assert_eq!(session.current_turn_number(), 2);
        assert_eq!(session.previous_tags(), ["cup", "book", "pen"]);
        assert_eq!(session.required_selection_count(), 2);
    }

    // =====================================================================
    // is_my_turn()
    // =====================================================================

    #[test]
    fn test_is_my_turn_player1_on_even_turns() {
        let session = started();
        assert!(session.is_my_turn("ada"));
        assert!(!session.is_my_turn("bob"));
        assert_eq!(session.whose_turn(), Some("ada"));
    }

    #[test]
    fn test_is_my_turn_player2_on_odd_turns() {
        let session = after_first_turn();
        assert!(!session.is_my_turn("ada"));
        assert!(session.is_my_turn("bob"));
        assert_eq!(session.whose_turn(), Some("bob"));
    }

    #[test]
    fn test_is_my_turn_spectator_never() {
        let session = started();
        assert!(!session.is_my_turn("eve"));
        let session = after_first_turn();
        assert!(!session.is_my_turn("eve"));
    }

    #[test]
    fn test_is_my_turn_missing_player2_nobody_on_odd_turn() {
        let mut game = Game::new(gid("neo-grid-max"), "ada", 0);
        game.turns.push(Turn {
            turn_number: 1,
            player_name: "ada".into(),
            photo_ref: "p".into(),
            tags: vec!["a".into(), "b".into(), "c".into()],
            shared_tag: None,
            detected_tags: vec!["a".into(), "b".into(), "c".into()],
            created_at_ms: 0,
        });
        let session = GameSession::new(game);
        assert!(!session.is_my_turn("ada"));
        assert_eq!(session.whose_turn(), None);
    }

    // =====================================================================
    // validate()
    // =====================================================================

    #[test]
    fn test_validate_uses_cached_previous_turn() {
        let session = after_first_turn();
        let tags = session
            .validate(&["book", "chair", "table"], &["chair", "table"])
            .unwrap();
        assert_eq!(tags.tags(), ["book", "chair", "table"]);
        assert_eq!(tags.shared_tag(), Some("book"));
    }

    #[test]
    fn test_validate_missing_shared_tag_fails() {
        let session = after_first_turn();
        let result = session.validate(&["chair", "table"], &["chair", "table"]);
        assert_eq!(result, Err(ValidationError::NoSharedTagDetected));
    }

    #[test]
    fn test_shared_tag_for_first_turn_is_none() {
        let session = started();
        assert_eq!(session.shared_tag_for(&["cup"]), None);
        let session = after_first_turn();
        assert_eq!(session.shared_tag_for(&["pen", "cup"]), Some("cup"));
    }

    #[test]
    fn test_selectable_tags_hides_shared() {
        let session = after_first_turn();
        assert_eq!(
            session.selectable_tags(&["chair", "book", "table"]),
            ["chair", "table"]
        );
    }

    // =====================================================================
    // append_turn()
    // =====================================================================

    #[test]
    fn test_append_turn_stores_canonical_tags() {
        let mut session = after_first_turn();
        let tags = session
            .validate(&["book", "chair", "table"], &["chair", "table"])
            .unwrap();

        let turn = session.append_turn(tags, "bob", "file://2.jpg", 2).unwrap();

        assert_eq!(turn.turn_number, 2);
        assert_eq!(turn.player_name, "bob");
        assert_eq!(turn.photo_ref, "file://2.jpg");
        assert_eq!(turn.shared_tag.as_deref(), Some("book"));
        assert_eq!(turn.tags, ["book", "chair", "table"]);
        assert_eq!(turn.detected_tags, ["book", "chair", "table"]);
    }

    #[test]
    fn test_append_turn_same_slot_twice_second_is_stale() {
        // Two submissions validated against the same slot: only the
        // first lands.
        let mut session = after_first_turn();
        let a = session
            .validate(&["book", "chair", "table"], &["chair", "table"])
            .unwrap();
        let b = session
            .validate(&["pen", "rug", "sofa"], &["rug", "sofa"])
            .unwrap();

        assert!(session.append_turn(a, "bob", "a.jpg", 2).is_ok());
        let result = session.append_turn(b, "bob", "b.jpg", 2);

        assert_eq!(
            result.unwrap_err(),
            ConflictError::StaleTurnNumber {
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(session.turns().len(), 2);
    }

    #[test]
    fn test_append_turn_future_slot_is_stale() {
        let mut session = started();
        let tags = session
            .validate(&["a", "b", "c"], &["a", "b", "c"])
            .unwrap();
        let result = session.append_turn(tags, "ada", "p", 5);
        assert!(matches!(
            result,
            Err(ConflictError::StaleTurnNumber { expected: 1, actual: 5 })
        ));
        assert!(session.turns().is_empty());
    }

    #[test]
    fn test_record_accepted_keeps_store_timestamps() {
        let mut session = started();
        let accepted = Turn {
            turn_number: 1,
            player_name: "ada".into(),
            photo_ref: "file://1.jpg".into(),
            tags: vec!["cup".into(), "book".into(), "pen".into()],
            shared_tag: None,
            detected_tags: vec!["cup".into(), "book".into(), "pen".into()],
            created_at_ms: 1_234,
        };

        let turn = session.record_accepted(accepted.clone()).unwrap();
        assert_eq!(*turn, accepted);
        assert_eq!(session.game().updated_at_ms, 1_234);
        assert_eq!(session.current_turn_number(), 2);
    }

    #[test]
    fn test_record_accepted_wrong_slot_is_stale() {
        let mut session = after_first_turn();
        let mut accepted = session.turns()[0].clone();
        accepted.player_name = "bob".into();

        let result = session.record_accepted(accepted);
        assert!(matches!(
            result,
            Err(ConflictError::StaleTurnNumber { expected: 2, actual: 1 })
        ));
        assert_eq!(session.turns().len(), 1);
    }

    #[test]
    fn test_submission_targets_current_slot() {
        let session = after_first_turn();
        let tags = session
            .validate(&["book", "chair", "table"], &["chair", "table"])
            .unwrap();

        let submission = session.submission(&tags, "bob", "file://2.jpg");

        assert_eq!(submission.turn_number, 2);
        assert_eq!(submission.player_name, "bob");
        assert_eq!(submission.shared_tag.as_deref(), Some("book"));
        assert_eq!(submission.tags, ["book", "chair", "table"]);
    }

    // =====================================================================
    // join() / state()
    // =====================================================================

    #[test]
    fn test_join_moves_to_in_progress() {
        let mut session =
            GameSession::new(Game::new(gid("sonic-core-z"), "ada", 0));
        assert_eq!(session.state(), SessionState::AwaitingPlayer2);

        session.join("bob").unwrap();

        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.game().player2_name.as_deref(), Some("bob"));
        assert_eq!(
            session.game().status,
            twovue_protocol::GameStatus::InProgress
        );
    }

    #[test]
    fn test_join_twice_already_joined() {
        let mut session = started();
        let result = session.join("eve");
        assert_eq!(result, Err(ConflictError::AlreadyJoined("bob".into())));
    }

    // =====================================================================
    // refresh()
    // =====================================================================

    #[test]
    fn test_refresh_replaces_cache() {
        let mut stale = started();
        let fresh = after_first_turn();

        stale.refresh(fresh.game().clone()).unwrap();

        assert_eq!(stale.current_turn_number(), 2);
        assert!(stale.is_my_turn("bob"));
    }

    #[test]
    fn test_refresh_then_stale_append_rejected() {
        // Bob's device validated turn 2 while Ada's view was behind; the
        // refresh lands Bob's turn and Ada's older candidate is stale.
        let mut session = after_first_turn();
        let mut other_device = session.clone();
        let bob_tags = other_device
            .validate(&["book", "chair", "table"], &["chair", "table"])
            .unwrap();
        other_device.append_turn(bob_tags, "bob", "b.jpg", 2).unwrap();

        let late = session
            .validate(&["pen", "rug", "sofa"], &["rug", "sofa"])
            .unwrap();
        session.refresh(other_device.game().clone()).unwrap();

        let result = session.append_turn(late, "bob", "late.jpg", 2);
        assert!(matches!(
            result,
            Err(ConflictError::StaleTurnNumber { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_refresh_other_game_mismatch() {
        let mut session = started();
        let other = Game::new(gid("beta-hub-two"), "cy", 0);

        let result = session.refresh(other);

        assert!(matches!(result, Err(ConflictError::GameMismatch { .. })));
        assert_eq!(session.game_id().as_str(), "cosmic-probe-one");
    }
}
