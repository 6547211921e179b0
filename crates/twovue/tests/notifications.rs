//! Integration tests for the notification path: store events → hub →
//! WebSocket → `ConnectionManager`, plus reconnect behavior against a
//! scripted raw server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use twovue::prelude::*;

const WAIT: Duration = Duration::from_secs(5);

// =========================================================================
// Helpers
// =========================================================================

async fn hub_for(store: &MemoryStore) -> HubHandle {
    let hub = NotificationHub::bind(&HubConfig::default().bind("127.0.0.1:0"), store)
        .await
        .expect("hub should bind");
    hub.spawn()
}

fn fast_config(ws_url: String) -> ClientConfig {
    ClientConfig::default()
        .with_ws_url(ws_url)
        .with_reconnect(3, Duration::from_millis(10))
}

/// Registration happens on the hub's side of the handshake, so poll
/// until the expected number of sockets is listening.
async fn wait_for_subscribers(hub: &HubHandle, game_id: &GameId, n: usize) {
    tokio::time::timeout(WAIT, async {
        while hub.subscriber_count(game_id).await != n {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("subscriber count should settle");
}

async fn next(rx: &mut mpsc::Receiver<Notification>) -> Option<Notification> {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("notification should arrive")
}

async fn raw_server() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    (listener, url)
}

fn frame(notification: &Notification) -> Message {
    Message::Text(serde_json::to_string(notification).unwrap().into())
}

// =========================================================================
// Hub → manager
// =========================================================================

#[tokio::test]
async fn test_store_events_reach_connection_manager() {
    let store = MemoryStore::spawn(StoreConfig::default());
    let hub = hub_for(&store).await;
    let mut manager = ConnectionManager::new(fast_config(hub.ws_url()));

    let game = store.create_game("ada").await.unwrap();
    let mut rx = manager.open(&game.id);
    assert!(manager.is_open(&game.id));
    wait_for_subscribers(&hub, &game.id, 1).await;

    store.join_game(&game.id, "bo").await.unwrap();
    assert_eq!(
        next(&mut rx).await,
        Some(Notification::PlayerJoined {
            player_name: "bo".into()
        })
    );

    let submission = TurnSubmission {
        player_name: "ada".into(),
        photo_ref: "p1".into(),
        turn_number: 1,
        tags: vec!["chair".into(), "table".into(), "lamp".into()],
        shared_tag: None,
        detected_tags: vec!["chair".into(), "table".into(), "lamp".into()],
    };
    store.submit_turn(&game.id, submission).await.unwrap();
    assert_eq!(
        next(&mut rx).await,
        Some(Notification::TurnSubmitted {
            turn_number: 1,
            player_name: "ada".into()
        })
    );
}

#[tokio::test]
async fn test_events_are_routed_per_game() {
    let store = MemoryStore::spawn(StoreConfig::default().with_seed(5));
    let hub = hub_for(&store).await;
    let mut manager = ConnectionManager::new(fast_config(hub.ws_url()));

    let watched = store.create_game("ada").await.unwrap();
    let other = store.create_game("cy").await.unwrap();
    let mut rx = manager.open(&watched.id);
    wait_for_subscribers(&hub, &watched.id, 1).await;

    store.join_game(&other.id, "di").await.unwrap();
    store.join_game(&watched.id, "bo").await.unwrap();

    // Only the watched game's join arrives.
    assert_eq!(
        next(&mut rx).await,
        Some(Notification::PlayerJoined {
            player_name: "bo".into()
        })
    );
    assert_eq!(hub.subscriber_count(&other.id).await, 0);
}

#[tokio::test]
async fn test_hub_publish_delivers_server_message() {
    let store = MemoryStore::spawn(StoreConfig::default());
    let hub = hub_for(&store).await;
    let mut manager = ConnectionManager::new(fast_config(hub.ws_url()));

    let game = store.create_game("ada").await.unwrap();
    let mut rx = manager.open(&game.id);
    wait_for_subscribers(&hub, &game.id, 1).await;

    let notice = Notification::Message {
        message: "maintenance at noon".into(),
    };
    let reached = hub.publish(&game.id, &notice).await.unwrap();
    assert_eq!(reached, 1);
    assert_eq!(next(&mut rx).await, Some(notice));
}

#[tokio::test]
async fn test_close_unsubscribes_from_hub() {
    let store = MemoryStore::spawn(StoreConfig::default());
    let hub = hub_for(&store).await;
    let mut manager = ConnectionManager::new(fast_config(hub.ws_url()));

    let game = store.create_game("ada").await.unwrap();
    let mut rx = manager.open(&game.id);
    wait_for_subscribers(&hub, &game.id, 1).await;

    assert!(manager.close(&game.id));
    assert!(!manager.is_open(&game.id));
    assert!(!manager.close(&game.id));
    assert_eq!(next(&mut rx).await, None);

    wait_for_subscribers(&hub, &game.id, 0).await;
}

#[tokio::test]
async fn test_hub_rejects_non_notification_path() {
    let store = MemoryStore::spawn(StoreConfig::default());
    let hub = hub_for(&store).await;

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("{}/lobby", hub.ws_url()))
        .await
        .expect("handshake still completes");

    // The hub closes right away.
    let closed = tokio::time::timeout(WAIT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok());
}

#[tokio::test]
async fn test_hub_shutdown_ends_client_stream() {
    let store = MemoryStore::spawn(StoreConfig::default());
    let hub = hub_for(&store).await;
    let config = ClientConfig::default()
        .with_ws_url(hub.ws_url())
        .with_reconnect(1, Duration::from_millis(10));
    let mut manager = ConnectionManager::new(config);

    let game = store.create_game("ada").await.unwrap();
    let mut rx = manager.open(&game.id);
    wait_for_subscribers(&hub, &game.id, 1).await;

    hub.shutdown();
    drop(hub);

    // Socket closes, the one reconnect fails, the stream ends.
    assert_eq!(next(&mut rx).await, None);
    assert!(!manager.is_open(&game.id));
}

// =========================================================================
// Manager against a scripted server
// =========================================================================

#[tokio::test]
async fn test_manager_skips_undecodable_frames() {
    let (listener, url) = raw_server().await;
    let game_id = GameId::parse("neo-probe-x").unwrap();
    let expected = Notification::TurnSubmitted {
        turn_number: 4,
        player_name: "bo".into(),
    };

    let script = expected.clone();
    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        ws.send(Message::Text("not json".into())).await.unwrap();
        ws.send(Message::Text(r#"{"type":"mystery"}"#.into()))
            .await
            .unwrap();
        ws.send(frame(&script)).await.unwrap();
        ws
    });

    let mut manager = ConnectionManager::new(fast_config(url));
    let mut rx = manager.open(&game_id);

    assert_eq!(next(&mut rx).await, Some(expected));
    drop(server.await.unwrap());
}

#[tokio::test]
async fn test_manager_reconnects_after_drop() {
    let (listener, url) = raw_server().await;
    let game_id = GameId::parse("sonic-array-nine").unwrap();

    let server = tokio::spawn(async move {
        // First connection: one notification, then hang up.
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        ws.send(frame(&Notification::Message {
            message: "first".into(),
        }))
        .await
        .unwrap();
        ws.close(None).await.unwrap();

        // The client comes back.
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        ws.send(frame(&Notification::Message {
            message: "second".into(),
        }))
        .await
        .unwrap();
        ws
    });

    let mut manager = ConnectionManager::new(fast_config(url));
    let mut rx = manager.open(&game_id);

    assert_eq!(
        next(&mut rx).await,
        Some(Notification::Message {
            message: "first".into()
        })
    );
    assert_eq!(
        next(&mut rx).await,
        Some(Notification::Message {
            message: "second".into()
        })
    );
    assert!(manager.is_open(&game_id));
    drop(server.await.unwrap());
}

#[tokio::test]
async fn test_manager_gives_up_after_max_attempts() {
    let (listener, url) = raw_server().await;
    drop(listener);
    let game_id = GameId::parse("meta-hub-one").unwrap();

    let mut manager = ConnectionManager::new(fast_config(url));
    let mut rx = manager.open(&game_id);

    assert_eq!(next(&mut rx).await, None);
    assert!(!manager.is_open(&game_id));
    assert!(manager.open_games().is_empty());
}

#[tokio::test]
async fn test_open_twice_replaces_previous_channel() {
    let (listener, url) = raw_server().await;
    drop(listener);
    let game_id = GameId::parse("beta-core-z").unwrap();
    let config = ClientConfig::default()
        .with_ws_url(url)
        .with_reconnect(100, Duration::from_millis(50));

    let mut manager = ConnectionManager::new(config);
    let mut first = manager.open(&game_id);
    let _second = manager.open(&game_id);

    // The first task was aborted, so its sender is gone.
    assert_eq!(next(&mut first).await, None);
    assert!(manager.is_open(&game_id));
    assert_eq!(manager.open_games(), vec![game_id]);
}
