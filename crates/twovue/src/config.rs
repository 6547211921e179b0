//! Client and hub configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use twovue_protocol::GameId;

/// Which [`GameStore`](twovue_store::GameStore) backs the client.
///
/// Chosen once at startup; nothing past construction branches on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// In-process [`MemoryStore`](twovue_store::MemoryStore).
    #[default]
    Memory,
}

/// Client-side settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the notification server, without the `/ws/...` path.
    pub ws_url: String,

    /// Reconnect attempts after a notification channel drops before
    /// giving up.
    pub max_reconnect_attempts: u32,

    /// Base reconnect delay. Attempt `n` waits `n * reconnect_delay`.
    pub reconnect_delay: Duration,

    /// Notifications buffered per open channel before the connection
    /// task waits for the reader.
    pub notification_buffer: usize,

    pub backend: Backend,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://127.0.0.1:8000".to_string(),
            max_reconnect_attempts: 5,
            reconnect_delay: Duration::from_millis(1000),
            notification_buffer: 32,
            backend: Backend::Memory,
        }
    }
}

impl ClientConfig {
    /// Reads overrides from the environment, falling back to defaults
    /// for anything unset or unparsable:
    ///
    /// - `TWOVUE_WS_URL`
    /// - `TWOVUE_RECONNECT_ATTEMPTS`
    /// - `TWOVUE_RECONNECT_DELAY_MS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) against any key/value source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let ws_url = lookup("TWOVUE_WS_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.ws_url);

        let max_reconnect_attempts = lookup("TWOVUE_RECONNECT_ATTEMPTS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_reconnect_attempts);

        let reconnect_delay = lookup("TWOVUE_RECONNECT_DELAY_MS")
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.reconnect_delay);

        Self {
            ws_url,
            max_reconnect_attempts,
            reconnect_delay,
            ..defaults
        }
    }

    pub fn with_ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = url.into();
        self
    }

    pub fn with_reconnect(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.max_reconnect_attempts = max_attempts;
        self.reconnect_delay = delay;
        self
    }

    /// Delay before reconnect attempt `attempt` (1-based): linear backoff.
    pub fn reconnect_delay_for(&self, attempt: u32) -> Duration {
        self.reconnect_delay.saturating_mul(attempt)
    }

    /// Full URL of a game's notification channel.
    pub fn notification_url(&self, game_id: &GameId) -> String {
        format!(
            "{}{}",
            self.ws_url.trim_end_matches('/'),
            game_id.notification_path()
        )
    }
}

/// Notification hub settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Address to listen on. Port 0 picks a free port.
    pub bind_addr: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
        }
    }
}

impl HubConfig {
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }
}
