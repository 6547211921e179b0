//! Client side of the notification channel.
//!
//! [`ConnectionManager`] owns one background task per watched game.
//! Each task dials `{ws_url}/ws/{game_id}`, decodes incoming frames into
//! [`Notification`]s and forwards them to the receiver handed out by
//! [`ConnectionManager::open`]. When the socket drops, the task
//! reconnects with linear backoff until it runs out of attempts.
//!
//! Notifications are hints. Receivers should refetch the game rather
//! than trust the payload.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use twovue_protocol::{Codec, GameId, JsonCodec, Notification};
use twovue_transport::{Connection, WebSocketConnection};

use crate::ClientConfig;

/// Why a connected session ended.
enum PumpEnd {
    /// The socket closed or errored; worth reconnecting.
    Disconnected,
    /// Nobody is listening anymore; stop for good.
    ReceiverGone,
}

/// Tracks the open notification channel of each game.
///
/// Dropping the manager closes every channel.
pub struct ConnectionManager<C: Codec + Clone = JsonCodec> {
    config: ClientConfig,
    codec: C,
    connections: HashMap<GameId, JoinHandle<()>>,
}

impl ConnectionManager<JsonCodec> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_codec(config, JsonCodec)
    }
}

impl<C: Codec + Clone> ConnectionManager<C> {
    pub fn with_codec(config: ClientConfig, codec: C) -> Self {
        Self {
            config,
            codec,
            connections: HashMap::new(),
        }
    }

    /// Starts watching a game. Replaces any channel already open for it.
    ///
    /// The returned receiver yields notifications until the channel is
    /// closed or reconnects are exhausted, then returns `None`.
    pub fn open(&mut self, game_id: &GameId) -> mpsc::Receiver<Notification> {
        self.close(game_id);

        let (tx, rx) = mpsc::channel(self.config.notification_buffer);
        let task = tokio::spawn(run_connection(
            self.config.clone(),
            game_id.clone(),
            self.codec.clone(),
            tx,
        ));
        self.connections.insert(game_id.clone(), task);
        rx
    }

    /// Stops watching a game. Returns `false` if it wasn't open.
    pub fn close(&mut self, game_id: &GameId) -> bool {
        match self.connections.remove(game_id) {
            Some(task) => {
                task.abort();
                tracing::info!(%game_id, "notification channel closed");
                true
            }
            None => false,
        }
    }

    pub fn close_all(&mut self) {
        for (game_id, task) in self.connections.drain() {
            task.abort();
            tracing::debug!(%game_id, "notification channel closed");
        }
    }

    /// Returns `true` while the game's connection task is alive
    /// (connected or between reconnect attempts).
    pub fn is_open(&self, game_id: &GameId) -> bool {
        self.connections
            .get(game_id)
            .is_some_and(|task| !task.is_finished())
    }

    /// Games with a live connection task.
    pub fn open_games(&self) -> Vec<GameId> {
        self.connections
            .iter()
            .filter(|(_, task)| !task.is_finished())
            .map(|(id, _)| id.clone())
            .collect()
    }
}

impl<C: Codec + Clone> Drop for ConnectionManager<C> {
    fn drop(&mut self) {
        self.close_all();
    }
}

// ---------------------------------------------------------------------------
// Connection task
// ---------------------------------------------------------------------------

async fn run_connection<C: Codec>(
    config: ClientConfig,
    game_id: GameId,
    codec: C,
    tx: mpsc::Sender<Notification>,
) {
    let url = config.notification_url(&game_id);
    let mut attempt: u32 = 0;

    loop {
        match WebSocketConnection::connect(&url).await {
            Ok(conn) => {
                tracing::info!(%game_id, "notification channel open");
                attempt = 0;
                match pump(&conn, &codec, &tx, &game_id).await {
                    PumpEnd::ReceiverGone => {
                        let _ = conn.close().await;
                        return;
                    }
                    PumpEnd::Disconnected => {
                        tracing::info!(%game_id, "notification channel dropped");
                    }
                }
            }
            Err(e) => {
                tracing::debug!(%game_id, error = %e, "notification connect failed");
            }
        }

        attempt += 1;
        if attempt > config.max_reconnect_attempts {
            tracing::warn!(
                %game_id,
                attempts = config.max_reconnect_attempts,
                "giving up on notification channel"
            );
            return;
        }

        let delay = config.reconnect_delay_for(attempt);
        tracing::debug!(%game_id, attempt, ?delay, "reconnecting");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = tx.closed() => return,
        }
    }
}

/// Forwards frames from one live connection until it ends.
async fn pump<C: Codec>(
    conn: &WebSocketConnection,
    codec: &C,
    tx: &mpsc::Sender<Notification>,
    game_id: &GameId,
) -> PumpEnd {
    loop {
        let frame = tokio::select! {
            _ = tx.closed() => return PumpEnd::ReceiverGone,
            frame = conn.recv() => frame,
        };

        let data = match frame {
            Ok(Some(data)) => data,
            Ok(None) => return PumpEnd::Disconnected,
            Err(e) => {
                tracing::debug!(%game_id, error = %e, "notification recv failed");
                return PumpEnd::Disconnected;
            }
        };

        let notification: Notification = match codec.decode(&data) {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(%game_id, error = %e, "skipping undecodable frame");
                continue;
            }
        };

        if tx.send(notification).await.is_err() {
            return PumpEnd::ReceiverGone;
        }
    }
}
