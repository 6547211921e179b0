//! Per-connection handler for notification subscribers.
//!
//! Each accepted socket gets its own Tokio task running this handler:
//!   1. Read the game id from the request path (`/ws/{game_id}`)
//!   2. Register an outbound queue under that game
//!   3. Loop: write queued frames, watch for the client going away
//!
//! Clients never send anything meaningful on this channel; inbound
//! frames are ignored.

use std::sync::Arc;

use tokio::sync::mpsc;
use twovue_protocol::{Codec, GameId};
use twovue_transport::{Connection, ConnectionId, WebSocketConnection};

use crate::TwovueError;
use crate::hub::{HubState, Subscriber};

/// Drop guard that unregisters a subscriber when the handler exits.
///
/// `Drop` is synchronous, so the async unregister runs in a
/// fire-and-forget task.
struct SubscriberGuard<C: Codec> {
    game_id: GameId,
    conn_id: ConnectionId,
    state: Arc<HubState<C>>,
}

impl<C: Codec> Drop for SubscriberGuard<C> {
    fn drop(&mut self) {
        let game_id = self.game_id.clone();
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.unregister(&game_id, conn_id).await;
        });
    }
}

/// Handles a single subscriber socket from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<HubState<C>>,
) -> Result<(), TwovueError> {
    let conn_id = conn.id();

    let game_id = match GameId::from_notification_path(conn.path()) {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!(%conn_id, path = conn.path(), "rejecting subscriber");
            let _ = conn.close().await;
            return Err(e.into());
        }
    };

    let (sender, mut outbound) = mpsc::unbounded_channel();
    state
        .register(game_id.clone(), Subscriber { conn_id, sender })
        .await;
    let _guard = SubscriberGuard {
        game_id: game_id.clone(),
        conn_id,
        state: Arc::clone(&state),
    };
    tracing::info!(%conn_id, %game_id, "subscriber connected");

    let mut shutdown = state.shutdown.clone();
    let stopping = *shutdown.borrow_and_update();
    if stopping {
        let _ = conn.close().await;
        return Ok(());
    }

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                conn.send(&frame).await?;
            }
            inbound = conn.recv() => match inbound {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "subscriber recv error");
                    break;
                }
            },
            // Either the flag flipped or the hub is gone.
            _ = shutdown.changed() => {
                let _ = conn.close().await;
                break;
            }
        }
    }

    tracing::info!(%conn_id, %game_id, "subscriber disconnected");
    // _guard drops here → unregister fires.
    Ok(())
}
