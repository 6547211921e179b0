//! Authoritative game storage for Twovue.
//!
//! A store owns the canonical record of every game and is the only
//! place a turn becomes real. It accepts at most one turn per turn slot,
//! re-checks the tag rules, and publishes a [`GameEvent`] after each
//! join and each accepted turn.
//!
//! # Key types
//!
//! - [`GameStore`] - the interface every backend implements
//! - [`MemoryStore`] - an actor-backed in-process store
//! - [`StoreConfig`] - channel sizes and id-generation seed
//! - [`StoreError`] - everything a store call can refuse with
//!
//! [`GameEvent`]: twovue_protocol::GameEvent

mod config;
mod error;
mod memory;
mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::GameStore;
