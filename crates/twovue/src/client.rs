//! `GameClient`: one player's entry point into the game.
//!
//! The client glues the layers together for a single player:
//!
//! ```text
//! detect(photo) → normalized tags
//!      ↓
//! submit_turn → GameSession::validate → GameStore::submit_turn
//!      ↓                                   ↓ StaleTurnNumber
//! GameSession::record_accepted        refresh session, report conflict
//! ```
//!
//! The store decides what happened. The session is only a cache, so on
//! any disagreement the client refetches rather than retrying.

use twovue_protocol::{GameId, Turn};
use twovue_session::{ConflictError, GameSession};
use twovue_store::{GameStore, StoreError};

use crate::detect::{Detector, normalize_labels};
use crate::TwovueError;

/// A player's handle on the game, generic over where games live (`S`)
/// and how photos are tagged (`D`).
pub struct GameClient<S: GameStore, D: Detector> {
    store: S,
    detector: D,
    player_name: String,
}

impl<S: GameStore, D: Detector> GameClient<S, D> {
    pub fn new(store: S, detector: D, player_name: impl Into<String>) -> Self {
        Self {
            store,
            detector,
            player_name: player_name.into(),
        }
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// The underlying store, e.g. to subscribe to its events.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Starts a new game with this player as player 1.
    pub async fn create_game(&self) -> Result<GameSession, TwovueError> {
        let game = self.store.create_game(&self.player_name).await?;
        tracing::info!(game_id = %game.id, player = %self.player_name, "created game");
        Ok(GameSession::new(game))
    }

    /// Joins a game as player 2 from a typed or pasted id.
    ///
    /// `raw_id` is normalized first, so `"Quantum Vector Alpha"` finds
    /// `quantum-vector-alpha`.
    pub async fn join_game(&self, raw_id: &str) -> Result<GameSession, TwovueError> {
        let game_id = GameId::parse(raw_id)?;
        let game = self.store.join_game(&game_id, &self.player_name).await?;
        tracing::info!(%game_id, player = %self.player_name, "joined game");
        Ok(GameSession::new(game))
    }

    /// Opens a session on an existing game without joining it.
    pub async fn load(&self, game_id: &GameId) -> Result<GameSession, TwovueError> {
        let game = self.store.get_game(game_id).await?;
        Ok(GameSession::new(game))
    }

    /// Replaces the session's cache with the store's current state.
    pub async fn refresh(&self, session: &mut GameSession) -> Result<(), TwovueError> {
        let game = self.store.get_game(session.game_id()).await?;
        session.refresh(game)?;
        Ok(())
    }

    /// Runs detection on a photo and normalizes the labels.
    pub async fn detect(&self, photo_ref: &str) -> Result<Vec<String>, TwovueError> {
        let raw = self.detector.detect(photo_ref).await?;
        Ok(normalize_labels(raw)?)
    }

    /// Validates and submits this player's turn.
    ///
    /// On success the turn the store accepted is also appended to
    /// `session`, timestamps included.
    ///
    /// # Errors
    /// - [`TwovueError::NotYourTurn`] before anything is sent
    /// - [`TwovueError::Validation`] if the selection breaks the rules
    /// - [`TwovueError::Conflict`] with
    ///   [`ConflictError::StaleTurnNumber`] if another submission won
    ///   the slot. `session` has been refreshed by then; the turn is not
    ///   resubmitted.
    pub async fn submit_turn<T: AsRef<str>>(
        &self,
        session: &mut GameSession,
        photo_ref: &str,
        detected_tags: &[String],
        selected_tags: &[T],
    ) -> Result<Turn, TwovueError> {
        if !session.is_my_turn(&self.player_name) {
            return Err(TwovueError::NotYourTurn {
                player: self.player_name.clone(),
            });
        }

        let candidate = session.validate(detected_tags, selected_tags)?;
        let submission = session.submission(&candidate, &self.player_name, photo_ref);

        match self.store.submit_turn(session.game_id(), submission).await {
            Ok(accepted) => {
                session.record_accepted(accepted.clone())?;
                Ok(accepted)
            }
            Err(StoreError::StaleTurnNumber { expected, actual }) => {
                tracing::info!(
                    game_id = %session.game_id(),
                    expected,
                    actual,
                    "turn slot already taken, refreshing"
                );
                self.refresh(session).await?;
                Err(ConflictError::StaleTurnNumber { expected, actual }.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
