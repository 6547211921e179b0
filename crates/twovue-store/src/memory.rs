//! In-memory store actor: one Tokio task that owns every game.
//!
//! All mutations funnel through a single mpsc channel, so the check
//! "is this turn number still next?" and the append that follows happen
//! without interleaving. That is the whole concurrency story: no locks,
//! just message passing.

use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{broadcast, mpsc, oneshot};
use twovue_protocol::{
    Game, GameEvent, GameId, GameStatus, Notification, Turn, TurnSubmission,
    unix_millis,
};

use crate::{GameStore, StoreConfig, StoreError};

/// Random draws before falling back to numbered ids.
const MAX_ID_ATTEMPTS: usize = 32;

/// Commands sent to the store actor through its channel.
///
/// Every variant carries a oneshot "reply channel": the caller sends the
/// command and waits for the answer on it.
enum StoreCommand {
    Create {
        player1_name: String,
        reply: oneshot::Sender<Result<Game, StoreError>>,
    },
    Get {
        game_id: GameId,
        reply: oneshot::Sender<Result<Game, StoreError>>,
    },
    Join {
        game_id: GameId,
        player2_name: String,
        reply: oneshot::Sender<Result<Game, StoreError>>,
    },
    Submit {
        game_id: GameId,
        submission: TurnSubmission,
        reply: oneshot::Sender<Result<Turn, StoreError>>,
    },
    Shutdown,
}

/// Handle to a running in-memory store.
///
/// Cheap to clone: an `mpsc::Sender` plus a `broadcast::Sender`. Every
/// clone talks to the same actor, so games created through one clone are
/// visible through all of them.
#[derive(Clone)]
pub struct MemoryStore {
    sender: mpsc::Sender<StoreCommand>,
    events: broadcast::Sender<GameEvent>,
}

impl MemoryStore {
    /// Spawns the store actor on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime (as `tokio::spawn` does).
    pub fn spawn(config: StoreConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_size);
        let (events, _) = broadcast::channel(config.event_capacity);

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let actor = StoreActor {
            games: HashMap::new(),
            rng,
            events: events.clone(),
            receiver: rx,
        };
        tokio::spawn(actor.run());

        Self { sender: tx, events }
    }

    /// Tells the actor to stop. Later calls on any clone return
    /// [`StoreError::Unavailable`].
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        self.sender
            .send(StoreCommand::Shutdown)
            .await
            .map_err(|_| StoreError::Unavailable)
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T, StoreError>>) -> StoreCommand,
    ) -> Result<T, StoreError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| StoreError::Unavailable)?;
        reply_rx.await.map_err(|_| StoreError::Unavailable)?
    }
}

impl GameStore for MemoryStore {
    async fn create_game(&self, player1_name: &str) -> Result<Game, StoreError> {
        let player1_name = player1_name.to_string();
        self.request(|reply| StoreCommand::Create { player1_name, reply })
            .await
    }

    async fn get_game(&self, game_id: &GameId) -> Result<Game, StoreError> {
        let game_id = game_id.clone();
        self.request(|reply| StoreCommand::Get { game_id, reply }).await
    }

    async fn join_game(
        &self,
        game_id: &GameId,
        player2_name: &str,
    ) -> Result<Game, StoreError> {
        let game_id = game_id.clone();
        let player2_name = player2_name.to_string();
        self.request(|reply| StoreCommand::Join {
            game_id,
            player2_name,
            reply,
        })
        .await
    }

    async fn submit_turn(
        &self,
        game_id: &GameId,
        submission: TurnSubmission,
    ) -> Result<Turn, StoreError> {
        let game_id = game_id.clone();
        self.request(|reply| StoreCommand::Submit {
            game_id,
            submission,
            reply,
        })
        .await
    }

    fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct StoreActor {
    games: HashMap<GameId, Game>,
    rng: StdRng,
    events: broadcast::Sender<GameEvent>,
    receiver: mpsc::Receiver<StoreCommand>,
}

impl StoreActor {
    async fn run(mut self) {
        tracing::info!("store actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                StoreCommand::Create {
                    player1_name,
                    reply,
                } => {
                    let _ = reply.send(Ok(self.handle_create(player1_name)));
                }
                StoreCommand::Get { game_id, reply } => {
                    let result = self
                        .games
                        .get(&game_id)
                        .cloned()
                        .ok_or(StoreError::NotFound(game_id));
                    let _ = reply.send(result);
                }
                StoreCommand::Join {
                    game_id,
                    player2_name,
                    reply,
                } => {
                    let _ = reply.send(self.handle_join(game_id, player2_name));
                }
                StoreCommand::Submit {
                    game_id,
                    submission,
                    reply,
                } => {
                    let result = self.handle_submit(&game_id, submission);
                    if let Err(e) = &result {
                        tracing::debug!(%game_id, error = %e, "turn rejected");
                    }
                    let _ = reply.send(result);
                }
                StoreCommand::Shutdown => {
                    tracing::info!(games = self.games.len(), "store shutting down");
                    break;
                }
            }
        }

        tracing::info!("store actor stopped");
    }

    fn handle_create(&mut self, player1_name: String) -> Game {
        let id = self.fresh_id();
        let game = Game::new(id.clone(), player1_name, unix_millis());
        tracing::info!(game_id = %id, player = %game.player1_name, "game created");
        self.games.insert(id, game.clone());
        game
    }

    fn fresh_id(&mut self) -> GameId {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = GameId::generate(&mut self.rng);
            if !self.games.contains_key(&id) {
                return id;
            }
        }
        let base = GameId::generate(&mut self.rng);
        let mut n = 2;
        loop {
            let id = base.numbered(n);
            if !self.games.contains_key(&id) {
                return id;
            }
            n += 1;
        }
    }

    fn handle_join(
        &mut self,
        game_id: GameId,
        player2_name: String,
    ) -> Result<Game, StoreError> {
        let Some(game) = self.games.get_mut(&game_id) else {
            return Err(StoreError::NotFound(game_id));
        };
        if game.status != GameStatus::WaitingForPlayer2 {
            return Err(StoreError::InvalidState(format!(
                "cannot join game in status {}",
                game.status
            )));
        }
        if game.player1_name == player2_name {
            return Err(StoreError::NameTaken(player2_name));
        }

        game.player2_name = Some(player2_name.clone());
        game.status = GameStatus::InProgress;
        game.updated_at_ms = unix_millis();
        let snapshot = game.clone();

        tracing::info!(%game_id, player = %player2_name, "player joined");
        self.publish(
            game_id,
            Notification::PlayerJoined {
                player_name: player2_name,
            },
        );
        Ok(snapshot)
    }

    fn handle_submit(
        &mut self,
        game_id: &GameId,
        submission: TurnSubmission,
    ) -> Result<Turn, StoreError> {
        let game = self
            .games
            .get_mut(game_id)
            .ok_or_else(|| StoreError::NotFound(game_id.clone()))?;

        if game.status != GameStatus::InProgress {
            return Err(StoreError::InvalidState(format!(
                "cannot submit a turn in status {}",
                game.status
            )));
        }

        let expected = game.next_turn_number();
        if submission.turn_number != expected {
            return Err(StoreError::StaleTurnNumber {
                expected,
                actual: submission.turn_number,
            });
        }

        if game.expected_author() != Some(submission.player_name.as_str()) {
            return Err(StoreError::NotYourTurn(submission.player_name));
        }

        check_tags(game, &submission)?;

        let turn = Turn {
            turn_number: submission.turn_number,
            player_name: submission.player_name,
            photo_ref: submission.photo_ref,
            tags: submission.tags,
            shared_tag: submission.shared_tag,
            detected_tags: submission.detected_tags,
            created_at_ms: unix_millis(),
        };
        game.turns.push(turn.clone());
        game.updated_at_ms = turn.created_at_ms;

        tracing::info!(
            %game_id,
            turn = turn.turn_number,
            player = %turn.player_name,
            "turn accepted"
        );
        self.publish(
            game_id.clone(),
            Notification::TurnSubmitted {
                turn_number: turn.turn_number,
                player_name: turn.player_name.clone(),
            },
        );
        Ok(turn)
    }

    /// Sends an event to every subscriber. No subscribers is fine.
    fn publish(&self, game_id: GameId, notification: Notification) {
        let _ = self.events.send(GameEvent {
            game_id,
            notification,
        });
    }
}

/// The stored pool must be what a detection could have produced:
/// bounded and free of repeats.
fn check_detected_pool(detected_tags: &[String]) -> Result<(), StoreError> {
    if detected_tags.len() > twovue_rules::MAX_DETECTED_TAGS {
        return Err(StoreError::InvalidSubmission(format!(
            "{} detected tags, at most {} allowed",
            detected_tags.len(),
            twovue_rules::MAX_DETECTED_TAGS
        )));
    }
    let mut seen = HashSet::with_capacity(detected_tags.len());
    if let Some(repeat) = detected_tags.iter().find(|tag| !seen.insert(tag.as_str())) {
        return Err(StoreError::InvalidSubmission(format!(
            "detected tag {repeat:?} listed twice"
        )));
    }
    Ok(())
}

/// Re-derives the canonical tags from the submission and checks the
/// client sent exactly those.
///
/// A submission stores the shared tag first, so the player's own picks
/// are everything after it.
fn check_tags(game: &Game, submission: &TurnSubmission) -> Result<(), StoreError> {
    check_detected_pool(&submission.detected_tags)?;

    let previous: &[String] = game
        .last_turn()
        .map(|t| t.tags.as_slice())
        .unwrap_or_default();

    let selected: &[String] = if submission.turn_number == 1 {
        &submission.tags
    } else {
        submission.tags.get(1..).unwrap_or_default()
    };

    let canonical = twovue_rules::validate_submission(
        submission.turn_number,
        previous,
        &submission.detected_tags,
        selected,
    )?;

    if canonical.tags() != submission.tags.as_slice() {
        return Err(StoreError::InvalidSubmission(format!(
            "expected tags {:?}, got {:?}",
            canonical.tags(),
            submission.tags
        )));
    }
    if canonical.shared_tag() != submission.shared_tag.as_deref() {
        return Err(StoreError::InvalidSubmission(format!(
            "expected shared tag {:?}, got {:?}",
            canonical.shared_tag(),
            submission.shared_tag
        )));
    }
    Ok(())
}
