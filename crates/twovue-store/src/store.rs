//! The `GameStore` trait: the authoritative home of every game.
//!
//! Clients never decide on their own that a turn happened. They ask a
//! store, and the store guarantees at most one accepted turn per turn
//! slot. Which store is used (the in-memory one, a remote backend) is
//! chosen once at startup and injected; nothing downstream branches on
//! it.

use std::future::Future;

use tokio::sync::broadcast;
use twovue_protocol::{Game, GameEvent, GameId, Turn, TurnSubmission};

use crate::StoreError;

/// The authoritative game store.
///
/// # Trait bounds
///
/// - `Send + Sync` → one store handle is shared by every task of the
///   client (or every connection of a server).
/// - `'static` → the store lives as long as the application.
/// - Returned futures are `Send` so callers can drive them from
///   spawned tasks.
pub trait GameStore: Send + Sync + 'static {
    /// Creates a game with player 1 and no turns, under a fresh id.
    fn create_game(
        &self,
        player1_name: &str,
    ) -> impl Future<Output = Result<Game, StoreError>> + Send;

    /// Fetches the current state of a game.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] for an unknown id.
    fn get_game(
        &self,
        game_id: &GameId,
    ) -> impl Future<Output = Result<Game, StoreError>> + Send;

    /// Records player 2 and moves the game to `IN_PROGRESS`.
    ///
    /// # Errors
    /// - [`StoreError::InvalidState`] if the game isn't waiting for a
    ///   second player
    /// - [`StoreError::NameTaken`] if the name is player 1's
    fn join_game(
        &self,
        game_id: &GameId,
        player2_name: &str,
    ) -> impl Future<Output = Result<Game, StoreError>> + Send;

    /// Appends a turn if and only if `submission.turn_number` is the
    /// next slot, the author is on turn, and the tags follow the rules.
    ///
    /// # Errors
    /// - [`StoreError::StaleTurnNumber`] if the slot is taken
    /// - [`StoreError::NotYourTurn`] if the author is not on turn
    /// - [`StoreError::Rejected`] / [`StoreError::InvalidSubmission`]
    ///   if the tags don't hold up
    fn submit_turn(
        &self,
        game_id: &GameId,
        submission: TurnSubmission,
    ) -> impl Future<Output = Result<Turn, StoreError>> + Send;

    /// Subscribes to join/turn events for all games.
    ///
    /// Best effort: a lagging subscriber misses events. Treat every
    /// event as a refetch hint.
    fn subscribe(&self) -> broadcast::Receiver<GameEvent>;
}
