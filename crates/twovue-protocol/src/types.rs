//! Game model and wire messages.
//!
//! Every type here is shared by the store, the session cache, and the
//! notification layer, and every type is serializable: games and turns
//! travel between the client and the authoritative store, notifications
//! travel over the real-time socket.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::GameId;

/// Milliseconds since the Unix epoch, the timestamp unit of the model.
///
/// A clock set before 1970 reads as 0.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// Where a game is in its lifecycle, as the store reports it.
///
/// ```text
/// WaitingForPlayer2 ──(player 2 joins)──→ InProgress
/// ```
///
/// `Completed` exists for wire compatibility with the backend but
/// nothing in Twovue moves a game into it: games are open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Created by player 1, nobody has joined yet.
    #[serde(rename = "WAITING_FOR_PLAYER2")]
    WaitingForPlayer2,
    /// Both players present; turns alternate indefinitely.
    InProgress,
    /// Reserved. See the type docs.
    Completed,
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForPlayer2 => write!(f, "WAITING_FOR_PLAYER2"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Turn
// ---------------------------------------------------------------------------

/// One accepted turn. Immutable once the store has stored it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// 1-based, gapless position in the game.
    pub turn_number: u32,

    /// Name of the player who took the photo.
    pub player_name: String,

    /// Photo URI or remote URL. Never interpreted.
    pub photo_ref: String,

    /// The canonical tags: exactly three, shared tag first for turns
    /// after the first.
    pub tags: Vec<String>,

    /// The tag carried over from the previous turn. `None` on turn 1.
    pub shared_tag: Option<String>,

    /// Everything the detector reported for the photo (at most 20
    /// labels). Kept so later turns could audit the shared tag.
    pub detected_tags: Vec<String>,

    /// Milliseconds since the Unix epoch when the store accepted it.
    pub created_at_ms: u64,
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// A full game as the store returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub player1_name: String,
    /// Absent until someone joins.
    pub player2_name: Option<String>,
    pub status: GameStatus,
    /// Append-only, ordered by `turn_number`.
    #[serde(default)]
    pub turns: Vec<Turn>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Game {
    /// A fresh game: one player, no turns.
    pub fn new(id: GameId, player1_name: impl Into<String>, now_ms: u64) -> Self {
        Self {
            id,
            player1_name: player1_name.into(),
            player2_name: None,
            status: GameStatus::WaitingForPlayer2,
            turns: Vec::new(),
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        }
    }

    /// The number the next accepted turn will carry.
    pub fn next_turn_number(&self) -> u32 {
        self.turns.len() as u32 + 1
    }

    /// The most recent turn, if any.
    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Whose move it is by turn parity: player 1 on an even number of
    /// existing turns, player 2 on an odd number.
    ///
    /// `None` when it's player 2's slot and nobody has joined.
    pub fn expected_author(&self) -> Option<&str> {
        if self.turns.len() % 2 == 0 {
            Some(&self.player1_name)
        } else {
            self.player2_name.as_deref()
        }
    }

    /// Returns `true` if `name` is one of the recorded players.
    pub fn is_player(&self, name: &str) -> bool {
        self.player1_name == name || self.player2_name.as_deref() == Some(name)
    }
}

// ---------------------------------------------------------------------------
// TurnSubmission
// ---------------------------------------------------------------------------

/// What a client sends to the store to append a turn.
///
/// `turn_number` is the slot the client believes is next. The store
/// accepts the submission only if that is still true, which is how two
/// racing devices are told apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSubmission {
    pub player_name: String,
    pub photo_ref: String,
    pub turn_number: u32,
    pub tags: Vec<String>,
    pub shared_tag: Option<String>,
    pub detected_tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// A real-time hint that a game changed.
///
/// Delivery is best effort with no ordering guarantee. Clients never
/// apply the payload; they refetch the game.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
///   `{ "type": "turn_submitted", "turn_number": 2, "player_name": "ada" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// Player 2 joined the game.
    PlayerJoined { player_name: String },

    /// A turn was accepted.
    TurnSubmitted { turn_number: u32, player_name: String },

    /// Free-form server text (maintenance notices and the like).
    Message { message: String },
}

/// A [`Notification`] tagged with the game it belongs to. This is what
/// stores publish and what the hub routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub game_id: GameId,
    pub notification: Notification,
}

// =========================================================================
// Tests
// =========================================================================
