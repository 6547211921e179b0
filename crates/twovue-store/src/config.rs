//! Store configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a [`MemoryStore`](crate::MemoryStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Capacity of the actor's command channel. When full, callers wait.
    pub channel_size: usize,

    /// Capacity of the event broadcast. Slow subscribers that fall more
    /// than this many events behind skip ahead.
    pub event_capacity: usize,

    /// Seed for game-id generation. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            channel_size: 64,
            event_capacity: 256,
            seed: None,
        }
    }
}

impl StoreConfig {
    /// Sets a fixed id-generation seed (tests, demos).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
