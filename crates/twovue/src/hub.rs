//! `NotificationHub`: the server end of the notification channel.
//!
//! The hub ties a store's event feed to WebSocket subscribers:
//!
//! ```text
//! GameStore::subscribe ──→ forward loop ──→ subscribers[game_id] ──→ sockets
//!                                  ↑
//! accept loop ──→ handler (one task per socket, registers itself)
//! ```
//!
//! Subscribers are kept in an explicit `GameId → Vec<Subscriber>` map
//! owned by the hub. Closed subscribers are pruned on the next delivery
//! and when their handler exits.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use twovue_protocol::{Codec, GameEvent, GameId, JsonCodec, Notification};
use twovue_store::GameStore;
use twovue_transport::{ConnectionId, Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{HubConfig, TwovueError};

/// One connected socket's outbound queue.
pub(crate) struct Subscriber {
    pub(crate) conn_id: ConnectionId,
    pub(crate) sender: mpsc::UnboundedSender<Vec<u8>>,
}

/// Shared hub state passed to each connection handler task.
pub(crate) struct HubState<C: Codec> {
    pub(crate) subscribers: Mutex<HashMap<GameId, Vec<Subscriber>>>,
    pub(crate) codec: C,
    /// Flips to `true` when the hub stops; handlers close their sockets.
    pub(crate) shutdown: watch::Receiver<bool>,
}

impl<C: Codec> HubState<C> {
    pub(crate) async fn register(&self, game_id: GameId, subscriber: Subscriber) {
        let mut subscribers = self.subscribers.lock().await;
        subscribers.entry(game_id).or_default().push(subscriber);
    }

    pub(crate) async fn unregister(&self, game_id: &GameId, conn_id: ConnectionId) {
        let mut subscribers = self.subscribers.lock().await;
        if let Some(list) = subscribers.get_mut(game_id) {
            list.retain(|s| s.conn_id != conn_id);
            if list.is_empty() {
                subscribers.remove(game_id);
            }
        }
    }

    /// Encodes once and queues the frame for every subscriber of the
    /// game. Returns how many subscribers it reached.
    async fn deliver(
        &self,
        game_id: &GameId,
        notification: &Notification,
    ) -> Result<usize, TwovueError> {
        let frame = self.codec.encode(notification)?;
        let mut subscribers = self.subscribers.lock().await;
        let Some(list) = subscribers.get_mut(game_id) else {
            return Ok(0);
        };
        list.retain(|s| s.sender.send(frame.clone()).is_ok());
        let reached = list.len();
        if list.is_empty() {
            subscribers.remove(game_id);
        }
        Ok(reached)
    }
}

/// A bound, not-yet-running hub.
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), twovue::TwovueError> {
/// use twovue::prelude::*;
///
/// let store = MemoryStore::spawn(StoreConfig::default());
/// let hub = NotificationHub::bind(&HubConfig::default(), &store).await?;
/// let handle = hub.spawn();
/// println!("notifications on {}", handle.local_addr());
/// # Ok(())
/// # }
/// ```
pub struct NotificationHub<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    local_addr: SocketAddr,
    events: broadcast::Receiver<GameEvent>,
    state: Arc<HubState<C>>,
    shutdown: watch::Sender<bool>,
}

impl NotificationHub<JsonCodec> {
    /// Binds the listener and subscribes to `store`'s events.
    pub async fn bind<S: GameStore>(
        config: &HubConfig,
        store: &S,
    ) -> Result<Self, TwovueError> {
        Self::bind_with_codec(config, store, JsonCodec).await
    }
}

impl<C: Codec> NotificationHub<C> {
    pub async fn bind_with_codec<S: GameStore>(
        config: &HubConfig,
        store: &S,
        codec: C,
    ) -> Result<Self, TwovueError> {
        let transport = WebSocketTransport::bind(&config.bind_addr).await?;
        let local_addr = transport.local_addr()?;
        let (shutdown, shutdown_rx) = watch::channel(false);
        Ok(Self {
            transport,
            local_addr,
            events: store.subscribe(),
            state: Arc::new(HubState {
                subscribers: Mutex::new(HashMap::new()),
                codec,
                shutdown: shutdown_rx,
            }),
            shutdown,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Starts the accept and forward loops in background tasks.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn spawn(self) -> HubHandle<C> {
        let local_addr = self.local_addr;

        let accept_task = tokio::spawn(accept_loop(self.transport, Arc::clone(&self.state)));
        let forward_task = tokio::spawn(forward_loop(self.events, Arc::clone(&self.state)));

        tracing::info!(%local_addr, "notification hub running");
        HubHandle {
            local_addr,
            state: self.state,
            shutdown: self.shutdown,
            accept_task,
            forward_task,
        }
    }
}

/// Handle to a running hub. Dropping it stops the hub.
pub struct HubHandle<C: Codec = JsonCodec> {
    local_addr: SocketAddr,
    state: Arc<HubState<C>>,
    shutdown: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
    forward_task: JoinHandle<()>,
}

impl<C: Codec> HubHandle<C> {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Base URL clients should use, e.g. `ws://127.0.0.1:8000`.
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.local_addr)
    }

    /// Number of sockets currently watching `game_id`.
    pub async fn subscriber_count(&self, game_id: &GameId) -> usize {
        self.state
            .subscribers
            .lock()
            .await
            .get(game_id)
            .map_or(0, Vec::len)
    }

    /// Pushes a notification to a game's subscribers directly, outside
    /// the store feed (server notices).
    pub async fn publish(
        &self,
        game_id: &GameId,
        notification: &Notification,
    ) -> Result<usize, TwovueError> {
        self.state.deliver(game_id, notification).await
    }

    /// Stops accepting and forwarding, and closes every open socket.
    pub fn shutdown(&self) {
        self.stop();
        tracing::info!(local_addr = %self.local_addr, "notification hub stopped");
    }
}

impl<C: Codec> HubHandle<C> {
    fn stop(&self) {
        self.shutdown.send_replace(true);
        self.accept_task.abort();
        self.forward_task.abort();
    }
}

impl<C: Codec> Drop for HubHandle<C> {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn accept_loop<C: Codec>(mut transport: WebSocketTransport, state: Arc<HubState<C>>) {
    loop {
        match transport.accept().await {
            Ok(conn) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(conn, state).await {
                        tracing::debug!(error = %e, "subscriber ended with error");
                    }
                });
            }
            Err(twovue_transport::TransportError::Shutdown) => break,
            Err(e) => {
                tracing::error!(error = %e, "accept failed");
            }
        }
    }
}

async fn forward_loop<C: Codec>(
    mut events: broadcast::Receiver<GameEvent>,
    state: Arc<HubState<C>>,
) {
    loop {
        match events.recv().await {
            Ok(event) => match state.deliver(&event.game_id, &event.notification).await {
                Ok(reached) => {
                    tracing::debug!(game_id = %event.game_id, reached, "notification forwarded");
                }
                Err(e) => {
                    tracing::warn!(game_id = %event.game_id, error = %e, "notification encode failed");
                }
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "hub fell behind store events");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("store event feed closed");
                break;
            }
        }
    }
}
