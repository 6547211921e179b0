//! # Twovue
//!
//! A two-player, turn-based photo game. Each turn a player photographs
//! something, a detector names the objects in it, and the player picks
//! tags. From the second turn on, one tag must carry over from the
//! previous turn's photo, so the game builds a chain of linked pictures.
//!
//! This crate is the facade over the workspace:
//!
//! - [`GameClient`] - create/join games, detect, submit turns
//! - [`ConnectionManager`] - client side of the real-time channel
//! - [`NotificationHub`] - server side, fed by a store's events
//! - [`Detector`] - photo → tags ([`MockDetector`] for offline play)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use twovue::prelude::*;
//!
//! # async fn demo() -> Result<(), TwovueError> {
//! let store = MemoryStore::spawn(StoreConfig::default());
//! let ada = GameClient::new(store.clone(), MockDetector::new(), "ada");
//! let bo = GameClient::new(store, MockDetector::new(), "bo");
//!
//! let mut session = ada.create_game().await?;
//! bo.join_game(&session.game_id().display_form()).await?;
//! ada.refresh(&mut session).await?;
//!
//! let detected = ada.detect("photo-1").await?;
//! ada.submit_turn(&mut session, "photo-1", &detected, &detected[..3]).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod connections;
pub mod detect;
mod error;
mod handler;
mod hub;

pub use client::GameClient;
pub use config::{Backend, ClientConfig, HubConfig};
pub use connections::ConnectionManager;
pub use detect::{DetectionError, Detector, FixedDetector, MockDetector};
pub use error::TwovueError;
pub use hub::{HubHandle, NotificationHub};

pub use twovue_protocol as protocol;
pub use twovue_rules as rules;
pub use twovue_session as session;
pub use twovue_store as store;
pub use twovue_transport as transport;

/// Everything needed to play a game, in one import.
pub mod prelude {
    pub use crate::{
        Backend, ClientConfig, ConnectionManager, DetectionError, Detector,
        FixedDetector, GameClient, HubConfig, HubHandle, MockDetector,
        NotificationHub, TwovueError,
    };
    pub use twovue_protocol::{
        Game, GameId, GameStatus, Notification, Turn, TurnSubmission,
    };
    pub use twovue_rules::{CanonicalTurnTags, ValidationError};
    pub use twovue_session::{ConflictError, GameSession, SessionState};
    pub use twovue_store::{GameStore, MemoryStore, StoreConfig, StoreError};
}
