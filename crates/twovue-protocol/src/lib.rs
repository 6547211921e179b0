//! Shared model and wire protocol for Twovue.
//!
//! This crate defines the "language" every other layer speaks:
//!
//! - **Identity** ([`GameId`]): human-shareable game tokens and the
//!   forgiving parser used when a player types one in.
//! - **Model** ([`Game`], [`Turn`], [`GameStatus`]): what the
//!   authoritative store keeps.
//! - **Messages** ([`TurnSubmission`], [`Notification`], [`GameEvent`]):
//!   what clients send and what the real-time channel pushes.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   become bytes.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (Notification) → Client (refetch)
//! ```

mod codec;
mod error;
mod game_id;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use game_id::{GameId, NOTIFICATION_PATH_PREFIX};
pub use types::{
    Game, GameEvent, GameStatus, Notification, Turn, TurnSubmission,
    unix_millis,
};
