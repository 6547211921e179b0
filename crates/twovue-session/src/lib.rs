//! Client-side game sessions for Twovue.
//!
//! This crate holds the client's view of one game:
//!
//! 1. **Turn bookkeeping**: whose turn it is, which slot is next, what
//!    the previous turn's tags were ([`GameSession`])
//! 2. **Validation**: running the turn rules against the cached
//!    history before anything is sent
//! 3. **Conflict detection**: refusing stale appends so a lost race
//!    surfaces as [`ConflictError::StaleTurnNumber`]
//!
//! # How it fits in the stack
//!
//! ```text
//! Client facade (above)  ← fetches games, submits turns, refreshes
//!     ↕
//! Session layer (this crate)  ← cached history + turn bookkeeping
//!     ↕
//! Rules + protocol (below)  ← turn rules, Game/Turn types
//! ```

mod error;
mod game_session;
mod session;

pub use error::ConflictError;
pub use game_session::GameSession;
pub use session::SessionState;
