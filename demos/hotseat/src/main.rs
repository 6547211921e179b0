//! Two players on one machine play a short tag chain against the
//! in-memory store, with a live notification hub watching the game.
//!
//! ```text
//! RUST_LOG=debug cargo run -p hotseat
//! ```

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing_subscriber::EnvFilter;
use twovue::prelude::*;

const TURNS: u32 = 6;
const MAX_RETAKES: u32 = 10;

type Player = GameClient<MemoryStore, MockDetector>;

// ---------------------------------------------------------------------------
// Turn loop
// ---------------------------------------------------------------------------

/// Detects until the photo can complete the turn, then submits a random
/// legal selection.
async fn play_turn(
    player: &Player,
    session: &mut GameSession,
    rng: &mut StdRng,
) -> Result<Turn, TwovueError> {
    let turn_number = session.current_turn_number();

    for retake in 0..MAX_RETAKES {
        let photo_ref = format!("photo-{turn_number}-{retake}");
        let detected = player.detect(&photo_ref).await?;

        if !twovue::rules::can_complete_turn(turn_number, session.previous_tags(), &detected) {
            tracing::info!(
                player = player.player_name(),
                turn_number,
                "no shared object in photo, retaking"
            );
            continue;
        }

        let pool = session.selectable_tags(&detected);
        let selected: Vec<&str> = pool
            .choose_multiple(rng, session.required_selection_count())
            .copied()
            .collect();

        return player
            .submit_turn(session, &photo_ref, &detected, &selected)
            .await;
    }

    Err(ValidationError::NoSharedTagDetected.into())
}

fn print_turn(turn: &Turn) {
    let shared = turn.shared_tag.as_deref().unwrap_or("-");
    println!(
        "turn {:>2}  {:<4} shared: {:<14} tags: {}",
        turn.turn_number,
        turn.player_name,
        shared,
        turn.tags.join(", ")
    );
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), TwovueError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ClientConfig::from_env();
    let store = match config.backend {
        Backend::Memory => MemoryStore::spawn(StoreConfig::default()),
    };

    let hub = NotificationHub::bind(&HubConfig::default().bind("127.0.0.1:0"), &store)
        .await?
        .spawn();
    let mut connections = ConnectionManager::new(config.with_ws_url(hub.ws_url()));

    let ada = GameClient::new(store.clone(), MockDetector::seeded(1), "ada");
    let bo = GameClient::new(store.clone(), MockDetector::seeded(2), "bo");

    let mut ada_session = ada.create_game().await?;
    let game_id = ada_session.game_id().clone();
    println!("game code: {}", game_id.display_form());

    let mut notifications = connections.open(&game_id);
    let watcher = tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            tracing::info!(?notification, "notification");
        }
    });

    // Bo types the code the way it was shown on screen.
    let mut bo_session = bo.join_game(&game_id.display_form()).await?;
    ada.refresh(&mut ada_session).await?;

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..TURNS {
        let (player, session) = if ada_session.is_my_turn(ada.player_name()) {
            (&ada, &mut ada_session)
        } else {
            (&bo, &mut bo_session)
        };

        let turn = play_turn(player, session, &mut rng).await?;
        print_turn(&turn);

        ada.refresh(&mut ada_session).await?;
        bo.refresh(&mut bo_session).await?;
    }

    connections.close_all();
    let _ = watcher.await;
    hub.shutdown();
    Ok(())
}
